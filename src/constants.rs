/// Default MySQL port used by the Audino docker image
pub const DEFAULT_MYSQL_PORT: u16 = 3306;

/// Directory name under ~/.config holding the credentials file
pub const APP_CONFIG_DIR: &str = "audino_relocate";
