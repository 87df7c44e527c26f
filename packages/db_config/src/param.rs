use strum::{Display, EnumIter, EnumString, IntoEnumIterator, IntoStaticStr};

/// The four connection parameters a [`crate::DbConfig`] carries.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, PartialOrd, Ord, Display, EnumIter, EnumString, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum DbParam {
    Host,
    User,
    Password,
    Database,
}

impl DbParam {
    /// Key of this parameter in the config mapping.
    pub fn key(&self) -> &'static str {
        (*self).into()
    }

    /// Environment variable this parameter is read from.
    pub fn env_var(&self) -> &'static str {
        match self {
            DbParam::Host => "DB_HOST",
            DbParam::User => "DB_USER",
            DbParam::Password => "DB_PASSWORD",
            DbParam::Database => "DB_DATABASE",
        }
    }

    /// An empty prefix is the same as no prefix.
    pub fn env_var_with_prefix(&self, prefix: Option<&str>) -> String {
        match prefix.filter(|prefix| !prefix.is_empty()) {
            Some(prefix) => format!("{}_{}", prefix, self.env_var()),
            None => self.env_var().to_string(),
        }
    }

    pub fn all() -> impl Iterator<Item = DbParam> {
        DbParam::iter()
    }
}
