//! Integration test: snapshot and export persistence.
//!
//! A registry saved to disk and loaded back must answer every query the
//! same way, continue its version and draft counters, and refuse files
//! whose invariants were broken by hand.

use citizen_registry::storage::{export_history, load_registry, read_export, save_registry};
use citizen_registry::{
    AgencyId, Caller, CitizenId, Profile, Registry, RegistryConfig, RegistryError, Submission,
};

fn cid(s: &str) -> CitizenId {
    CitizenId::new(s).unwrap()
}

fn populated() -> Registry {
    let reg = Registry::default();
    reg.register_agency(&Caller::Administrator, "LHDN", "", "pw")
        .unwrap();
    reg.register_agency(&Caller::Administrator, "KWSP", "", "pw")
        .unwrap();

    let c = cid("C1");
    let owner = Caller::Citizen(c.clone());
    reg.register_citizen(&owner, &c, Profile::seed("v1", "F", 0, ""))
        .unwrap();
    reg.submit(&Caller::Organization(AgencyId(1)), &c, Profile::seed("v2", "F", 0, ""))
        .unwrap();
    reg.submit(&owner, &c, Profile::seed("v3", "F", 0, "")).unwrap();
    reg.apply_version(&owner, &c, 2).unwrap();
    reg.set_grant(&owner, &c, AgencyId(2), true).unwrap();

    reg.submit(
        &Caller::Organization(AgencyId(2)),
        &cid("X"),
        Profile::seed("draft", "M", 0, ""),
    )
    .unwrap();
    reg
}

#[test]
fn persistence_snapshot_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.json");

    let reg = populated();
    save_registry(&reg, &path).unwrap();
    let loaded = load_registry(&path, RegistryConfig::default()).unwrap();

    assert_eq!(loaded.stats().unwrap(), reg.stats().unwrap());

    let c = cid("C1");
    let owner = Caller::Citizen(c.clone());
    assert_eq!(loaded.list_versions(&owner, &c).unwrap(), vec![1, 2, 3, 4]);
    assert_eq!(
        loaded.read_current(&owner, &c).unwrap(),
        reg.read_current(&owner, &c).unwrap()
    );
    assert_eq!(loaded.history(&owner, &c).unwrap(), reg.history(&owner, &c).unwrap());

    // Grants survive.
    assert!(loaded
        .read_current(&Caller::Organization(AgencyId(2)), &c)
        .is_ok());
    assert!(loaded
        .read_current(&Caller::Organization(AgencyId(1)), &c)
        .is_err());

    // Counters continue where they left off.
    assert_eq!(
        loaded.submit(&owner, &c, Profile::default()).unwrap(),
        Submission::Appended(5)
    );
    assert_eq!(
        loaded
            .submit(&Caller::Organization(AgencyId(1)), &cid("X"), Profile::default())
            .unwrap(),
        Submission::Staged(2)
    );
}

#[test]
fn persistence_file_uses_flat_profile_field_names() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.json");
    save_registry(&populated(), &path).unwrap();

    let raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    assert_eq!(raw["version"], 1);
    assert_eq!(raw["format"], "creg-v1");

    let v1 = &raw["state"]["citizens"][0]["versions"][0]["profile"];
    assert_eq!(v1["fullName"], "v1");
    assert_eq!(v1["DOB"], 0);
    assert_eq!(v1["zipCode"], "");
    assert_eq!(v1["reliefAmount"], 0);
}

#[test]
fn persistence_rejects_gap_in_versions() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.json");
    save_registry(&populated(), &path).unwrap();

    let mut raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    raw["state"]["citizens"][0]["versions"]
        .as_array_mut()
        .unwrap()
        .remove(1);
    std::fs::write(&path, serde_json::to_vec(&raw).unwrap()).unwrap();

    assert!(matches!(
        load_registry(&path, RegistryConfig::default()),
        Err(RegistryError::InvalidFileFormat(_))
    ));
}

#[test]
fn persistence_rejects_dangling_pointer() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("registry.json");
    save_registry(&populated(), &path).unwrap();

    let mut raw: serde_json::Value =
        serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
    raw["state"]["citizens"][0]["current"] = serde_json::json!(99);
    std::fs::write(&path, serde_json::to_vec(&raw).unwrap()).unwrap();

    assert!(load_registry(&path, RegistryConfig::default()).is_err());
}

#[test]
fn persistence_export_requires_read_access() {
    let dir = tempfile::tempdir().unwrap();
    let reg = populated();
    let c = cid("C1");

    assert!(matches!(
        reg.export_history(&Caller::Organization(AgencyId(1)), &c),
        Err(RegistryError::AccessDenied(_))
    ));

    let path = dir.path().join("exports").join("C1.json");
    let history = reg
        .export_history(&Caller::Organization(AgencyId(2)), &c)
        .unwrap();
    export_history(history, &path).unwrap();

    let back = read_export(&path).unwrap();
    assert_eq!(back.citizen, c);
    assert_eq!(back.current, 4);
    assert_eq!(back.versions.len(), 4);
    assert_eq!(back.versions[1].submitted_by, "LHDN");
}
