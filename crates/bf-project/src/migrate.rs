//! Schema migration framework.

use crate::ProjectError;
use crate::schema::Case;

pub const LATEST_VERSION: u32 = 1;

pub fn migrate_to_latest(mut case: Case) -> Result<Case, ProjectError> {
    while case.version < LATEST_VERSION {
        case = migrate_one_version(case)?;
    }
    Ok(case)
}

fn migrate_one_version(case: Case) -> Result<Case, ProjectError> {
    match case.version {
        0 => migrate_v0_to_v1(case),
        v => Err(ProjectError::Migration {
            what: format!("No migration path from version {}", v),
        }),
    }
}

/// Version 0 cases predate the schema version field; the layout is unchanged.
fn migrate_v0_to_v1(mut case: Case) -> Result<Case, ProjectError> {
    case.version = 1;
    Ok(case)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::single_track;

    #[test]
    fn unversioned_case_is_upgraded() {
        let mut case = single_track();
        case.version = 0;
        let migrated = migrate_to_latest(case).unwrap();
        assert_eq!(migrated.version, LATEST_VERSION);
    }
}
