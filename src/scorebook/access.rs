//! Who may see what.
//!
//! A [`Caller`] is whatever the identity provider vouched for: a username plus
//! role flags. [`AccessScope::resolve`] turns those flags into a visibility
//! predicate over sheets:
//!
//! - **Privileged** callers (staff, superuser, or member of the editor group)
//!   see every sheet.
//! - Everyone else sees public sheets only.

use crate::model::Sheet;
use serde::Serialize;

/// Default name of the internal group whose members count as privileged.
pub const DEFAULT_EDITOR_GROUP: &str = "editors";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Caller {
    pub username: String,
    pub is_staff: bool,
    pub is_superuser: bool,
    pub groups: Vec<String>,
}

impl Caller {
    /// An authenticated caller without any role flags.
    pub fn member(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            is_staff: false,
            is_superuser: false,
            groups: Vec::new(),
        }
    }

    /// The local operator, as used by the CLI.
    pub fn operator(username: impl Into<String>) -> Self {
        Self {
            is_superuser: true,
            ..Self::member(username)
        }
    }

    pub fn with_staff(mut self, is_staff: bool) -> Self {
        self.is_staff = is_staff;
        self
    }

    pub fn with_groups<I, G>(mut self, groups: I) -> Self
    where
        I: IntoIterator<Item = G>,
        G: Into<String>,
    {
        self.groups = groups.into_iter().map(Into::into).collect();
        self
    }

    pub fn in_group(&self, group: &str) -> bool {
        self.groups.iter().any(|g| g == group)
    }

    pub fn is_privileged(&self, editor_group: &str) -> bool {
        self.is_staff || self.is_superuser || self.in_group(editor_group)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AccessScope {
    All,
    PublicOnly,
}

impl AccessScope {
    pub fn resolve(caller: &Caller, editor_group: &str) -> Self {
        if caller.is_privileged(editor_group) {
            AccessScope::All
        } else {
            AccessScope::PublicOnly
        }
    }

    pub fn admits(self, sheet: &Sheet) -> bool {
        match self {
            AccessScope::All => true,
            AccessScope::PublicOnly => sheet.public,
        }
    }

    /// Keeps only the sheets this scope admits.
    pub fn narrow(self, sheets: Vec<Sheet>) -> Vec<Sheet> {
        sheets.into_iter().filter(|s| self.admits(s)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::fixtures::blob;

    fn sheet(public: bool) -> Sheet {
        let mut sheet = Sheet::new("Rorate caeli", "Chorál", "jana", blob("r.pdf"));
        sheet.public = public;
        sheet
    }

    #[test]
    fn each_role_flag_alone_is_enough() {
        let staff = Caller::member("a").with_staff(true);
        let superuser = Caller::operator("b");
        let editor = Caller::member("c").with_groups(["choir", DEFAULT_EDITOR_GROUP]);
        for caller in [&staff, &superuser, &editor] {
            assert_eq!(
                AccessScope::resolve(caller, DEFAULT_EDITOR_GROUP),
                AccessScope::All
            );
        }
    }

    #[test]
    fn plain_member_gets_public_scope() {
        let caller = Caller::member("d").with_groups(["choir"]);
        assert_eq!(
            AccessScope::resolve(&caller, DEFAULT_EDITOR_GROUP),
            AccessScope::PublicOnly
        );
    }

    #[test]
    fn editor_group_name_is_configurable() {
        let caller = Caller::member("e").with_groups(["archivists"]);
        assert_eq!(
            AccessScope::resolve(&caller, "archivists"),
            AccessScope::All
        );
        assert_eq!(
            AccessScope::resolve(&caller, DEFAULT_EDITOR_GROUP),
            AccessScope::PublicOnly
        );
    }

    #[test]
    fn private_sheet_visibility() {
        let private = sheet(false);
        assert!(!AccessScope::PublicOnly.admits(&private));
        assert!(AccessScope::All.admits(&private));

        let public = sheet(true);
        assert!(AccessScope::PublicOnly.admits(&public));
        assert!(AccessScope::All.admits(&public));
    }

    #[test]
    fn narrow_drops_private_sheets() {
        let sheets = vec![sheet(true), sheet(false), sheet(true)];
        assert_eq!(AccessScope::PublicOnly.narrow(sheets.clone()).len(), 2);
        assert_eq!(AccessScope::All.narrow(sheets).len(), 3);
    }
}
