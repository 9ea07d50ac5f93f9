//! Scale test: long version runs and large staging queues.

use citizen_registry::{Caller, CitizenId, Profile, Registry, RegistryConfig};

fn cid(s: &str) -> CitizenId {
    CitizenId::new(s).unwrap()
}

#[test]
fn stress_10k_versions_one_citizen() {
    let reg = Registry::default();
    let c = cid("LONG");
    let owner = Caller::Citizen(c.clone());
    reg.register_citizen(&owner, &c, Profile::seed("v1", "M", 0, ""))
        .unwrap();

    for i in 2..=10_000u64 {
        let mut p = Profile::seed("v", "M", 0, "");
        p.income.income_amount = i;
        reg.submit(&owner, &c, p).unwrap();
    }

    let versions = reg.list_versions(&owner, &c).unwrap();
    assert_eq!(versions.len(), 10_000);
    assert!(versions.windows(2).all(|w| w[1] == w[0] + 1));
    assert_eq!(
        reg.read_version(&owner, &c, 7_777).unwrap().income.income_amount,
        7_777
    );

    reg.apply_version(&owner, &c, 5_000).unwrap();
    assert_eq!(reg.read_current(&owner, &c).unwrap().income.income_amount, 5_000);
    assert_eq!(reg.list_versions(&owner, &c).unwrap().len(), 10_001);
}

#[test]
fn stress_1k_drafts_migrate_in_order() {
    let reg = Registry::default();
    let agency = reg
        .register_agency(&Caller::Administrator, "Bulk", "", "pw")
        .unwrap();
    let org = Caller::Organization(agency);
    let x = cid("QUEUED");

    for i in 1..=1_000u64 {
        let mut p = Profile::default();
        p.household.household_size = i;
        reg.submit(&org, &x, p).unwrap();
    }

    let owner = Caller::Citizen(x.clone());
    let report = reg
        .register_citizen(&owner, &x, Profile::seed("seed", "F", 0, ""))
        .unwrap();
    assert_eq!(report.migration.migrated.len(), 1_000);
    assert!(report
        .migration
        .migrated
        .iter()
        .all(|m| m.version == m.draft + 1));

    for v in [2, 500, 1_001] {
        assert_eq!(
            reg.read_version(&owner, &x, v).unwrap().household.household_size,
            v - 1
        );
    }
}

#[test]
fn stress_version_cap_partial_migration_at_scale() {
    let reg = Registry::new(RegistryConfig {
        max_versions_per_citizen: Some(100),
        ..RegistryConfig::default()
    });
    let agency = reg
        .register_agency(&Caller::Administrator, "Capped", "", "pw")
        .unwrap();
    let x = cid("CAPPED");
    for _ in 0..250 {
        reg.submit(&Caller::Organization(agency), &x, Profile::default())
            .unwrap();
    }

    let owner = Caller::Citizen(x.clone());
    let report = reg
        .register_citizen(&owner, &x, Profile::seed("seed", "F", 0, ""))
        .unwrap();
    let partial = report.migration.partial.unwrap();
    assert_eq!(report.migration.migrated.len(), 99);
    assert_eq!(partial.failed_draft, 100);
    assert_eq!(partial.pending.len(), 151);
    assert_eq!(reg.pending_drafts(&owner, &x).unwrap().len(), 151);
    assert_eq!(reg.list_versions(&owner, &x).unwrap().len(), 100);
}
