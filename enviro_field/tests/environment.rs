//! Environment file through transport selection to a decoded query.

use std::fs;

use enviro::consts::{FROM_FIELD_FILE, TO_FIELD_FILE};
use enviro::module::Module;
use enviro_field::cli::{Args, channel_config};
use enviro_field::settings::FieldSettings;
use enviro_field::{EnvironmentDescription, FieldSession, GetStage};
use enviro_ipc::channel::exchange_path;
use enviro_ipc::testing::FileDriver;
use enviro_ipc::{ChannelKind, FileChannel};
use tempfile::TempDir;

#[test]
fn files_environment_decodes_wrapped_query() {
    let dir = TempDir::new().unwrap();
    let env_path = dir.path().join("soil.e");
    fs::write(
        &env_path,
        "communication type: files\nexecutable: soil_field -e soil.e\n",
    )
    .unwrap();

    let environment = EnvironmentDescription::load(&env_path).unwrap();
    let args = Args {
        environment: Some(env_path),
        extension: Some(".3".into()),
        key: 4242,
        config: None,
        verbose: false,
        json: false,
    };
    let mut settings = FieldSettings::default();
    settings.files.directory = dir.path().to_path_buf();

    let config = channel_config(&args, &environment, &settings);
    assert_eq!(config.kind, ChannelKind::Files);
    assert_eq!(config.semaphore_key, 4242);

    let ext = config.extension.as_deref();
    let driver = FileDriver::new(
        exchange_path(&config.directory, TO_FIELD_FILE, ext),
        exchange_path(&config.directory, FROM_FIELD_FILE, ext),
        vec!["7E(A)(B(1,2))\nControl: 3 1\n".into()],
    )
    .unwrap();
    let channel = FileChannel::with_handshake(&config.directory, ext, Box::new(driver));
    let mut session = FieldSession::new(Box::new(channel), environment.turtle);

    session.get_data(GetStage::Begin).unwrap();
    let query = session.get_data(GetStage::Data).unwrap().unwrap();
    assert_eq!(query.index, 7);
    assert_eq!(query.comm_symbol, Module::new('A'));
    assert!(query.comm_symbol.params.is_empty());
    assert_eq!(
        query.next_symbol,
        Some(Module::with_params('B', &[1.0, 2.0]).unwrap())
    );
    assert_eq!(session.get_data(GetStage::Data).unwrap(), None);
    assert_eq!(session.step(), Some(1));
}
