//! Linux System V shared memory and semaphore calls.
//!
//! The field process only ever attaches to objects the driver created:
//! nothing here passes `IPC_CREAT` or removes an object.

use crate::error::{IpcError, IpcResult};
use nix::errno::Errno;
use nix::unistd::getpid;
use std::ptr::NonNull;

/// Attach an existing shared-memory segment and check it holds at least
/// `min_size` bytes.
pub fn shm_attach(key: i32, min_size: usize) -> IpcResult<NonNull<u8>> {
    let id = match Errno::result(unsafe { libc::shmget(key as libc::key_t, 0, 0) }) {
        Ok(id) => id,
        Err(Errno::ENOENT) => return Err(IpcError::SegmentNotFound { key }),
        Err(e) => return Err(e.into()),
    };

    // SAFETY: shmid_ds is plain old data; the kernel fills it in.
    let mut stat: libc::shmid_ds = unsafe { std::mem::zeroed() };
    Errno::result(unsafe { libc::shmctl(id, libc::IPC_STAT, &mut stat) })?;
    let actual = stat.shm_segsz as usize;
    if actual < min_size {
        return Err(IpcError::SegmentTooSmall {
            expected: min_size,
            actual,
        });
    }

    let addr = Errno::result(unsafe { libc::shmat(id, std::ptr::null(), 0) })?;
    NonNull::new(addr.cast::<u8>()).ok_or(IpcError::SegmentNotFound { key })
}

/// Detach a segment previously returned by [`shm_attach`].
pub fn shm_detach(addr: NonNull<u8>) -> IpcResult<()> {
    Errno::result(unsafe { libc::shmdt(addr.as_ptr().cast::<libc::c_void>()) })?;
    Ok(())
}

/// Look up an existing semaphore set of `count` semaphores.
pub fn sem_attach(key: i32, count: i32) -> IpcResult<i32> {
    match Errno::result(unsafe { libc::semget(key as libc::key_t, count, 0) }) {
        Ok(id) => Ok(id),
        Err(Errno::ENOENT) => Err(IpcError::SemaphoresNotFound { key }),
        Err(e) => Err(e.into()),
    }
}

/// Set the value of semaphore `num`.
pub fn sem_set_value(id: i32, num: u16, value: i32) -> IpcResult<()> {
    Errno::result(unsafe { libc::semctl(id, libc::c_int::from(num), libc::SETVAL, value) })?;
    Ok(())
}

/// Current value of semaphore `num`.
pub fn sem_value(id: i32, num: u16) -> IpcResult<i32> {
    let value = Errno::result(unsafe { libc::semctl(id, libc::c_int::from(num), libc::GETVAL) })?;
    Ok(value)
}

/// Add `delta` to semaphore `num`, blocking while the result would be
/// negative. Interrupted calls are restarted; there is no timeout.
pub fn sem_adjust(id: i32, num: u16, delta: i16) -> IpcResult<()> {
    let mut op = libc::sembuf {
        sem_num: num,
        sem_op: delta,
        sem_flg: 0,
    };
    loop {
        match Errno::result(unsafe { libc::semop(id, &mut op, 1) }) {
            Ok(_) => return Ok(()),
            Err(Errno::EINTR) => continue,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Get current process ID
pub fn get_current_pid() -> u32 {
    getpid().as_raw() as u32
}
