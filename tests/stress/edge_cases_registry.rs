//! Edge case tests: boundary inputs, failed writes and odd identifiers.
//!
//! A failed write must never leave an orphaned version or a skipped
//! sequence number, and reads outside the version range must always fail
//! the same way.

use citizen_registry::{
    AgencyId, Caller, CitizenId, Profile, ProfileSection, Registry, RegistryConfig,
    RegistryError, ReliefInfo,
};

fn cid(s: &str) -> CitizenId {
    CitizenId::new(s).unwrap()
}

fn registered(reg: &Registry, id: &str, versions: u64) -> (CitizenId, Caller) {
    let c = cid(id);
    let owner = Caller::Citizen(c.clone());
    reg.register_citizen(&owner, &c, Profile::seed("v1", "F", 0, ""))
        .unwrap();
    for i in 2..=versions {
        reg.submit(&owner, &c, Profile::seed(format!("v{i}"), "F", 0, ""))
            .unwrap();
    }
    (c, owner)
}

#[test]
fn edge_read_version_outside_range_always_invalid() {
    let reg = Registry::default();
    let (c, owner) = registered(&reg, "C1", 5);
    for n in [0, 6, 7, 1_000, u64::MAX / 2, u64::MAX] {
        assert!(
            matches!(
                reg.read_version(&owner, &c, n),
                Err(RegistryError::InvalidVersion { latest: 5, .. })
            ),
            "version {n} should be rejected"
        );
    }
}

#[test]
fn edge_rollback_keeps_history_and_counter() {
    let reg = Registry::default();
    let (c, owner) = registered(&reg, "C1", 5);

    reg.apply_version(&owner, &c, 3).unwrap();
    let current = reg.read_current(&owner, &c).unwrap();
    assert_eq!(current, reg.read_version(&owner, &c, 3).unwrap());
    assert_eq!(reg.list_versions(&owner, &c).unwrap(), vec![1, 2, 3, 4, 5, 6]);

    let details = reg.citizen_details(&c).unwrap();
    assert_eq!(details.current_version, Some(6));
}

#[test]
fn edge_failed_append_leaves_no_gap() {
    let reg = Registry::new(RegistryConfig {
        max_versions_per_citizen: Some(3),
        ..RegistryConfig::default()
    });
    let (c, owner) = registered(&reg, "C1", 3);

    for _ in 0..5 {
        assert!(matches!(
            reg.submit(&owner, &c, Profile::default()),
            Err(RegistryError::VersionLimitReached { limit: 3, .. })
        ));
    }
    assert!(reg
        .update_section(&owner, &c, ProfileSection::Relief(ReliefInfo::default()))
        .is_err());
    assert_eq!(reg.list_versions(&owner, &c).unwrap(), vec![1, 2, 3]);
    assert_eq!(reg.stats().unwrap().total_updates, 2);
}

#[test]
fn edge_identifiers_are_trimmed_and_validated() {
    assert_eq!(cid("  A-1  "), cid("A-1"));
    assert!(CitizenId::new("").is_err());
    assert!(CitizenId::new("   ").is_err());
    assert!(CitizenId::new("bad\nid").is_err());

    let reg = Registry::default();
    let (c, owner) = registered(&reg, " padded ", 1);
    assert_eq!(c.as_str(), "padded");
    assert!(reg.read_current(&owner, &cid("padded")).is_ok());
}

#[test]
fn edge_unicode_identifier_and_payload() {
    let reg = Registry::default();
    let c = cid("身份证-0001");
    let owner = Caller::Citizen(c.clone());
    let mut p = Profile::seed("Zhāng Wěi 张伟", "M", 0, "");
    p.address.city = "Kuala Lumpur 吉隆坡".into();
    reg.register_citizen(&owner, &c, p.clone()).unwrap();
    assert_eq!(reg.read_current(&owner, &c).unwrap(), p);
}

#[test]
fn edge_grant_unknown_agency_and_default_denied() {
    let reg = Registry::default();
    let (c, owner) = registered(&reg, "C1", 1);

    // No agencies registered at all: an empty, error-free grant list.
    assert!(reg.grants(&c).unwrap().is_empty());
    assert!(matches!(
        reg.set_grant(&owner, &c, AgencyId(1), true),
        Err(RegistryError::AgencyNotFound(1))
    ));
    assert!(matches!(
        reg.read_current(&Caller::Organization(AgencyId(1)), &c),
        Err(RegistryError::AccessDenied(_))
    ));
}

#[test]
fn edge_pending_drafts_visibility() {
    let reg = Registry::default();
    let agency = reg
        .register_agency(&Caller::Administrator, "A", "", "pw")
        .unwrap();
    let x = cid("X");
    reg.submit(&Caller::Organization(agency), &x, Profile::default())
        .unwrap();

    assert_eq!(reg.pending_drafts(&Caller::Citizen(x.clone()), &x).unwrap().len(), 1);
    assert_eq!(reg.pending_drafts(&Caller::Administrator, &x).unwrap().len(), 1);
    assert!(matches!(
        reg.pending_drafts(&Caller::Organization(agency), &x),
        Err(RegistryError::AccessDenied(_))
    ));
    assert!(matches!(
        reg.pending_drafts(&Caller::Citizen(cid("Y")), &x),
        Err(RegistryError::AccessDenied(_))
    ));
}

#[test]
fn edge_resume_migration_requires_registration() {
    let reg = Registry::default();
    let x = cid("X");
    assert!(matches!(
        reg.resume_migration(&Caller::Citizen(x.clone()), &x),
        Err(RegistryError::NotRegistered(_))
    ));

    let (c, owner) = registered(&reg, "C1", 1);
    let report = reg.resume_migration(&owner, &c).unwrap();
    assert!(report.is_complete());
    assert!(report.migrated.is_empty());
}

#[test]
fn edge_missing_profile_fields_default_to_empty() {
    let p = Profile::from_json(r#"{ "fullName": "Only Name" }"#).unwrap();
    assert_eq!(p.personal.full_name, "Only Name");
    assert_eq!(p.personal.dob, 0);
    assert_eq!(p.address.home_address, "");
    assert_eq!(p.relief.relief_amount, 0);
    assert!(Profile::from_json(r#"{ "DOB": "yesterday" }"#).is_err());
}
