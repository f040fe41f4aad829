//! Configuration access port trait.
//!
//! Missing keys fall back to the supplied default; a value that is present
//! but unparseable is a `ConfigInvalid` error rather than a silent default.

use crate::domain::error::TradelabError;

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
    fn get_int(&self, section: &str, key: &str, default: i64) -> Result<i64, TradelabError>;
    fn get_double(&self, section: &str, key: &str, default: f64) -> Result<f64, TradelabError>;
}
