//! Configuration access port.
//!
//! Values come back as raw strings; typed parsing and range checks live in
//! `domain::screen_config` so every adapter reports bad values the same way.

pub trait ConfigPort {
    fn get_string(&self, section: &str, key: &str) -> Option<String>;
}
