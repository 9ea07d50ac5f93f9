//! Concurrency test: parallel writers against one registry.
//!
//! Validates that per-citizen serialization keeps every version run
//! contiguous, that registration and staging never race into a lost draft,
//! and that different citizens proceed independently.

use std::collections::HashSet;
use std::sync::{Arc, Barrier};
use std::thread;

use citizen_registry::{Caller, CitizenId, Profile, Registry, Submission};

fn cid(s: &str) -> CitizenId {
    CitizenId::new(s).unwrap()
}

fn registry_with_agency() -> (Arc<Registry>, Caller) {
    let reg = Registry::default();
    let id = reg
        .register_agency(&Caller::Administrator, "Stress Agency", "", "pw")
        .unwrap();
    (Arc::new(reg), Caller::Organization(id))
}

#[test]
fn stress_50_concurrent_appends_same_citizen() {
    let (reg, org) = registry_with_agency();
    let c = cid("HOT");
    let owner = Caller::Citizen(c.clone());
    reg.register_citizen(&owner, &c, Profile::seed("v1", "F", 0, ""))
        .unwrap();

    let mut handles = Vec::new();
    for thread_id in 0..50 {
        let reg = Arc::clone(&reg);
        let c = c.clone();
        let caller = if thread_id % 2 == 0 {
            owner.clone()
        } else {
            org.clone()
        };
        handles.push(thread::spawn(move || {
            let mut versions = Vec::new();
            for i in 0..20 {
                let profile = Profile::seed(format!("t{thread_id}-{i}"), "F", 0, "");
                match reg.submit(&caller, &c, profile).unwrap() {
                    Submission::Appended(v) => versions.push(v),
                    Submission::Staged(_) => panic!("registered citizen must not stage"),
                }
            }
            versions
        }));
    }

    let mut seen = HashSet::new();
    for h in handles {
        for v in h.join().unwrap() {
            assert!(seen.insert(v), "version {v} handed out twice");
        }
    }

    let versions = reg.list_versions(&owner, &c).unwrap();
    assert_eq!(versions, (1..=1001).collect::<Vec<_>>());
    assert_eq!(seen.len(), 1000);
    assert_eq!(reg.citizen_details(&c).unwrap().current_version, Some(1001));
}

#[test]
fn stress_registration_races_staging() {
    // Agencies keep submitting while the citizen registers. Every submission
    // must end up either migrated or appended: none may be left behind or
    // applied twice.
    for round in 0..10 {
        let (reg, org) = registry_with_agency();
        let c = cid(&format!("RACE-{round}"));
        let barrier = Arc::new(Barrier::new(5));

        let mut submitters = Vec::new();
        for t in 0..4 {
            let reg = Arc::clone(&reg);
            let org = org.clone();
            let c = c.clone();
            let barrier = Arc::clone(&barrier);
            submitters.push(thread::spawn(move || {
                barrier.wait();
                for i in 0..25 {
                    reg.submit(&org, &c, Profile::seed(format!("{t}-{i}"), "M", 0, ""))
                        .unwrap();
                }
            }));
        }

        let registrar = {
            let reg = Arc::clone(&reg);
            let c = c.clone();
            let barrier = Arc::clone(&barrier);
            thread::spawn(move || {
                barrier.wait();
                reg.register_citizen(&Caller::Citizen(c.clone()), &c, Profile::seed("seed", "M", 0, ""))
                    .unwrap()
            })
        };

        for h in submitters {
            h.join().unwrap();
        }
        let report = registrar.join().unwrap();
        assert!(report.migration.is_complete());

        let owner = Caller::Citizen(c.clone());
        assert_eq!(reg.list_versions(&owner, &c).unwrap().len(), 101);
        assert!(reg.pending_drafts(&owner, &c).unwrap().is_empty());
        assert_eq!(reg.stats().unwrap().pending_drafts, 0);
    }
}

#[test]
fn stress_100_citizens_in_parallel() {
    let (reg, org) = registry_with_agency();

    let mut handles = Vec::new();
    for t in 0..100 {
        let reg = Arc::clone(&reg);
        let org = org.clone();
        handles.push(thread::spawn(move || {
            let c = CitizenId::new(format!("P-{t:03}")).unwrap();
            let owner = Caller::Citizen(c.clone());
            reg.submit(&org, &c, Profile::seed("draft", "F", 0, "")).unwrap();
            reg.register_citizen(&owner, &c, Profile::seed("seed", "F", 0, ""))
                .unwrap();
            for i in 0..10 {
                reg.submit(&owner, &c, Profile::seed(format!("u{i}"), "F", 0, ""))
                    .unwrap();
            }
            reg.apply_version(&owner, &c, 1).unwrap();
        }));
    }
    for h in handles {
        h.join().unwrap();
    }

    let stats = reg.stats().unwrap();
    assert_eq!(stats.total_citizens, 100);
    // Per citizen: 1 migrated draft + 10 updates + 1 applied copy.
    assert_eq!(stats.total_updates, 100 * 12);
    assert_eq!(stats.pending_drafts, 0);
}

#[test]
fn stress_readers_see_grant_changes_immediately() {
    let (reg, org) = registry_with_agency();
    let Caller::Organization(agency) = org else {
        unreachable!()
    };
    let c = cid("GRANTED");
    let owner = Caller::Citizen(c.clone());
    reg.register_citizen(&owner, &c, Profile::seed("v1", "F", 0, ""))
        .unwrap();

    for _ in 0..200 {
        reg.set_grant(&owner, &c, agency, true).unwrap();
        assert!(reg.read_current(&org, &c).is_ok());
        reg.set_grant(&owner, &c, agency, false).unwrap();
        assert!(reg.read_current(&org, &c).is_err());
    }

    let readers: Vec<_> = (0..8)
        .map(|_| {
            let reg = Arc::clone(&reg);
            let c = c.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    assert!(reg.read_current(&Caller::Citizen(c.clone()), &c).is_ok());
                }
            })
        })
        .collect();
    for h in readers {
        h.join().unwrap();
    }
}

#[test]
fn stress_readers_never_see_half_migrated_drafts() {
    let (reg, org) = registry_with_agency();
    let x = cid("MIGRATING");
    let owner = Caller::Citizen(x.clone());
    for i in 0..2_000 {
        reg.submit(&org, &x, Profile::seed(format!("d{i}"), "F", 0, ""))
            .unwrap();
    }

    let barrier = Arc::new(Barrier::new(2));
    let registrar = {
        let reg = Arc::clone(&reg);
        let x = x.clone();
        let owner = owner.clone();
        let barrier = Arc::clone(&barrier);
        thread::spawn(move || {
            barrier.wait();
            reg.register_citizen(&owner, &x, Profile::seed("seed", "F", 0, ""))
                .unwrap()
        })
    };

    // Versions are read before drafts: once draft 1 shows up as version 2,
    // it must already be gone from staging.
    barrier.wait();
    let mut ambiguous = 0;
    loop {
        let versions = reg.list_versions(&owner, &x).unwrap();
        let pending = reg.pending_drafts(&owner, &x).unwrap();
        if versions.len() >= 2 && pending.iter().any(|d| d.number == 1) {
            ambiguous += 1;
        }
        if !versions.is_empty() {
            assert_eq!(versions.len(), 2_001, "registration observed mid-migration");
        }
        if pending.is_empty() {
            break;
        }
    }

    let report = registrar.join().unwrap();
    assert!(report.migration.is_complete());
    assert_eq!(ambiguous, 0);
    assert!(reg.pending_drafts(&owner, &x).unwrap().is_empty());
}
