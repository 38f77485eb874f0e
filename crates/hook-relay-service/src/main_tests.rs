use super::*;
use hook_relay_api::ConfigError;

#[test]
fn test_exit_codes() {
    assert_eq!(
        exit_code(&ServiceError::BindFailed {
            address: "0.0.0.0:80".to_string(),
            message: "permission denied".to_string(),
        }),
        1
    );
    assert_eq!(
        exit_code(&ServiceError::ServerFailed {
            message: "io".to_string(),
        }),
        2
    );
    assert_eq!(
        exit_code(&ServiceError::Configuration(ConfigError::Missing {
            key: "telegram.bot_token".to_string(),
        })),
        3
    );
    assert_eq!(
        exit_code(&ServiceError::ClientSetup {
            message: "tls".to_string(),
        }),
        4
    );
}
