use super::*;
use crate::config::RegistryConfigBuilder;
use chrono::TimeZone;
use rstest::rstest;
use std::time::Duration;
use tollgate_core::{Principal, WebApplicationService};
use tollgate_ticket::{ExpirationPolicyConfig, IdleTimeout};

const APP: &str = "https://app.example.com/login";
const OTHER_APP: &str = "https://other.example.com/login";
const PROXY: &str = "https://proxy.example.com/callback";

fn t(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(1_700_000_000 + secs, 0).unwrap()
}

fn registry() -> TicketRegistry {
    TicketRegistry::new(RegistryConfig::default()).unwrap()
}

fn login(principal: &str) -> Authentication {
    Authentication::at(Principal::new(principal), t(0))
}

fn service(url: &str) -> WebApplicationService {
    WebApplicationService::from_url(url)
}

#[test]
fn test_validate_returns_assertion() {
    let registry = registry();
    let tgt = registry
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();
    let st = registry
        .grant_service_ticket_at(tgt.id(), WebApplicationService::shared(APP), false, t(1))
        .unwrap();

    assert_eq!(st.prefix(), Some("ST"));
    assert!(registry.contains_service_ticket(&st));

    let assertion = registry
        .validate_service_ticket_at(&st, &service(APP), t(2))
        .unwrap();
    assert_eq!(assertion.principal().id(), "alice");
    assert_eq!(assertion.service().id(), APP);
    assert!(assertion.is_from_new_login());
    assert!(!assertion.is_proxied());
}

#[rstest]
#[case::removed_when_spent(true)]
#[case::kept_until_next_attempt(false)]
fn test_single_use_ticket_validates_once(#[case] remove_expired_on_validation: bool) {
    let config = RegistryConfigBuilder::new()
        .remove_expired_on_validation(remove_expired_on_validation)
        .build()
        .unwrap();
    let registry = TicketRegistry::new(config).unwrap();
    let tgt = registry
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();
    let st = registry
        .grant_service_ticket_at(tgt.id(), WebApplicationService::shared(APP), false, t(1))
        .unwrap();

    assert!(registry
        .validate_service_ticket_at(&st, &service(APP), t(2))
        .is_ok());
    assert_eq!(
        registry.contains_service_ticket(&st),
        !remove_expired_on_validation
    );

    let err = registry
        .validate_service_ticket_at(&st, &service(APP), t(3))
        .unwrap_err();
    if remove_expired_on_validation {
        assert!(matches!(err, Error::TicketNotFound { .. }));
    } else {
        assert!(matches!(err, Error::TicketExpired { .. }));
    }
    assert!(!registry.contains_service_ticket(&st));
}

#[test]
fn test_mismatch_consumes_the_ticket() {
    let registry = registry();
    let tgt = registry
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();
    let st = registry
        .grant_service_ticket_at(tgt.id(), WebApplicationService::shared(APP), false, t(1))
        .unwrap();

    let err = registry
        .validate_service_ticket_at(&st, &service(OTHER_APP), t(2))
        .unwrap_err();
    assert!(matches!(err, Error::ServiceMismatch { ref service, .. } if service == OTHER_APP));

    let err = registry
        .validate_service_ticket_at(&st, &service(APP), t(3))
        .unwrap_err();
    assert!(err.is_ticket_rejection());
}

#[test]
fn test_session_identifier_ignored_when_matching() {
    let registry = registry();
    let tgt = registry
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();
    let st = registry
        .grant_service_ticket_at(
            tgt.id(),
            WebApplicationService::shared(format!("{APP};jsessionid=ABC123")),
            false,
            t(1),
        )
        .unwrap();

    assert!(registry
        .validate_service_ticket_at(&st, &service(APP), t(2))
        .is_ok());
}

#[test]
fn test_only_first_grant_is_new_login() {
    let registry = registry();
    let tgt = registry
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();

    let first = registry
        .grant_service_ticket_at(tgt.id(), WebApplicationService::shared(APP), false, t(1))
        .unwrap();
    let second = registry
        .grant_service_ticket_at(tgt.id(), WebApplicationService::shared(APP), false, t(2))
        .unwrap();
    let renewed = registry
        .grant_service_ticket_at(tgt.id(), WebApplicationService::shared(APP), true, t(3))
        .unwrap();

    let from_new_login =
        |id: &TicketId| registry.with_service_ticket(id, ServiceTicket::is_from_new_login);
    assert_eq!(from_new_login(&first), Some(true));
    assert_eq!(from_new_login(&second), Some(false));
    assert_eq!(from_new_login(&renewed), Some(true));
    assert_eq!(tgt.count_of_granted_services(), 3);
    assert_eq!(tgt.count_of_uses(), 3);
}

#[test]
fn test_throttled_ticket_survives_spaced_reuse() {
    let config = RegistryConfigBuilder::new()
        .service_ticket_policy(ExpirationPolicyConfig::ThrottledUseAndTimeout {
            time_to_kill_secs: 60,
            time_between_uses_secs: 5,
        })
        .build()
        .unwrap();
    let registry = TicketRegistry::new(config).unwrap();
    let tgt = registry
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();
    let st = registry
        .grant_service_ticket_at(tgt.id(), WebApplicationService::shared(APP), false, t(1))
        .unwrap();

    assert!(registry
        .validate_service_ticket_at(&st, &service(APP), t(2))
        .is_ok());
    assert!(registry.contains_service_ticket(&st));

    assert!(registry
        .validate_service_ticket_at(&st, &service(APP), t(20))
        .is_ok());
    assert!(registry.contains_service_ticket(&st));

    // Too soon after the previous use: honoured once, then spent
    assert!(registry
        .validate_service_ticket_at(&st, &service(APP), t(22))
        .is_ok());
    assert!(!registry.contains_service_ticket(&st));

    let err = registry
        .validate_service_ticket_at(&st, &service(APP), t(30))
        .unwrap_err();
    assert!(matches!(err, Error::TicketNotFound { .. }));
}

#[test]
fn test_expired_service_ticket_rejected_and_removed() {
    let registry = registry();
    let tgt = registry
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();
    let st = registry
        .grant_service_ticket_at(tgt.id(), WebApplicationService::shared(APP), false, t(1))
        .unwrap();

    let err = registry
        .validate_service_ticket_at(&st, &service(APP), t(60))
        .unwrap_err();
    assert!(matches!(err, Error::TicketExpired { .. }));
    assert!(!registry.contains_service_ticket(&st));
}

#[test]
fn test_expired_session_rejects_its_tickets() {
    let registry = registry();
    let tgt = registry
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();
    let st = registry
        .grant_service_ticket_at(tgt.id(), WebApplicationService::shared(APP), false, t(1))
        .unwrap();

    tgt.mark_expired();

    let err = registry
        .validate_service_ticket_at(&st, &service(APP), t(2))
        .unwrap_err();
    assert!(matches!(err, Error::TicketExpired { .. }));
    assert!(!registry.contains_service_ticket(&st));

    let err = registry
        .grant_service_ticket_at(tgt.id(), WebApplicationService::shared(APP), false, t(3))
        .unwrap_err();
    assert!(matches!(err, Error::TicketExpired { .. }));
}

#[test]
fn test_idle_session_cannot_grant() {
    let registry = registry();
    let tgt = registry
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();

    let err = registry
        .grant_service_ticket_at(tgt.id(), WebApplicationService::shared(APP), false, t(7200))
        .unwrap_err();
    assert!(matches!(err, Error::TicketExpired { .. }));
}

#[test]
fn test_unknown_tickets() {
    let registry = registry();
    let unknown = TicketId::new("ST-0-unknown").unwrap();

    let err = registry
        .validate_service_ticket_at(&unknown, &service(APP), t(0))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::TicketNotFound {
            kind: TicketKind::ServiceTicket,
            ..
        }
    ));

    let err = registry
        .grant_service_ticket_at(&unknown, WebApplicationService::shared(APP), false, t(0))
        .unwrap_err();
    assert!(matches!(
        err,
        Error::TicketNotFound {
            kind: TicketKind::TicketGrantingTicket,
            ..
        }
    ));

    assert!(registry.destroy_ticket_granting_ticket(&unknown).is_empty());
}

#[test]
fn test_proxy_chain_assertion() {
    let registry = registry();
    let tgt = registry
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();
    let st = registry
        .grant_service_ticket_at(tgt.id(), WebApplicationService::shared(PROXY), false, t(1))
        .unwrap();

    let pgt = registry
        .delegate_ticket_granting_ticket_at(&st, login(PROXY), t(2))
        .unwrap();
    assert_eq!(pgt.kind(), TicketKind::ProxyGrantingTicket);
    assert_eq!(pgt.parent_id(), Some(tgt.id()));
    assert_eq!(registry.session_count(), 1);
    assert_eq!(registry.ticket_granting_ticket_count(), 2);

    // Delegation leaves the service ticket unspent
    assert!(registry
        .validate_service_ticket_at(&st, &service(PROXY), t(3))
        .is_ok());

    let proxied = registry
        .grant_service_ticket_at(pgt.id(), WebApplicationService::shared(APP), false, t(4))
        .unwrap();
    let assertion = registry
        .validate_service_ticket_at(&proxied, &service(APP), t(5))
        .unwrap();

    assert!(assertion.is_proxied());
    assert_eq!(assertion.principal().id(), "alice");
    let chain: Vec<&str> = assertion
        .chained_authentications()
        .iter()
        .map(|authentication| authentication.principal().id())
        .collect();
    assert_eq!(chain, vec!["alice", PROXY]);
}

#[test]
fn test_delegation_happens_once() {
    let registry = registry();
    let tgt = registry
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();
    let st = registry
        .grant_service_ticket_at(tgt.id(), WebApplicationService::shared(PROXY), false, t(1))
        .unwrap();

    registry
        .delegate_ticket_granting_ticket_at(&st, login(PROXY), t(2))
        .unwrap();
    let err = registry
        .delegate_ticket_granting_ticket_at(&st, login(PROXY), t(3))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState { .. }));
    assert_eq!(registry.ticket_granting_ticket_count(), 2);
}

#[test]
fn test_destroy_cascades_to_descendants() {
    let registry = registry();
    let tgt = registry
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();
    let other = registry
        .create_ticket_granting_ticket_at(login("bob"), t(0))
        .unwrap();
    let st = registry
        .grant_service_ticket_at(tgt.id(), WebApplicationService::shared(PROXY), false, t(1))
        .unwrap();
    let pgt = registry
        .delegate_ticket_granting_ticket_at(&st, login(PROXY), t(2))
        .unwrap();
    let proxied = registry
        .grant_service_ticket_at(pgt.id(), WebApplicationService::shared(APP), false, t(3))
        .unwrap();
    let unrelated = registry
        .grant_service_ticket_at(other.id(), WebApplicationService::shared(APP), false, t(3))
        .unwrap();

    let removed = registry.destroy_ticket_granting_ticket(tgt.id());

    assert_eq!(removed.first(), Some(tgt.id()));
    assert_eq!(removed.len(), 4);
    for id in [tgt.id(), pgt.id(), &st, &proxied] {
        assert!(removed.contains(id), "{id} should have been removed");
    }
    assert!(tgt.is_marked_expired());
    assert!(pgt.is_expired_at(t(4)));
    assert!(registry.ticket_granting_ticket(pgt.id()).is_none());
    assert!(registry.contains_service_ticket(&unrelated));
    assert_eq!(registry.ticket_granting_ticket_count(), 1);
    assert_eq!(registry.service_ticket_count(), 1);
}

#[test]
fn test_cleanup_removes_expired_tickets() {
    let registry = registry();
    let idle = registry
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();
    let active = registry
        .create_ticket_granting_ticket_at(login("bob"), t(0))
        .unwrap();
    let orphaned = registry
        .grant_service_ticket_at(idle.id(), WebApplicationService::shared(APP), false, t(1))
        .unwrap();
    let stale = registry
        .grant_service_ticket_at(active.id(), WebApplicationService::shared(APP), false, t(7000))
        .unwrap();

    let report = registry.cleanup_at(t(7300));

    assert_eq!(
        report,
        CleanupReport {
            ticket_granting_tickets_removed: 1,
            service_tickets_removed: 2,
        }
    );
    assert_eq!(report.total(), 3);
    assert!(registry.ticket_granting_ticket(idle.id()).is_none());
    assert!(registry.ticket_granting_ticket(active.id()).is_some());
    assert!(!registry.contains_service_ticket(&orphaned));
    assert!(!registry.contains_service_ticket(&stale));

    assert_eq!(registry.cleanup_at(t(7301)), CleanupReport::default());
}

#[test]
fn test_snapshot_restores_into_fresh_registry() {
    let source = registry();
    let tgt = source
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();
    let st = source
        .grant_service_ticket_at(tgt.id(), WebApplicationService::shared(PROXY), false, t(1))
        .unwrap();
    let pgt = source
        .delegate_ticket_granting_ticket_at(&st, login(PROXY), t(2))
        .unwrap();
    let proxied = source
        .grant_service_ticket_at(pgt.id(), WebApplicationService::shared(APP), false, t(3))
        .unwrap();

    let json = source.snapshot().to_json().unwrap();
    let snapshot = RegistrySnapshot::from_json(&json).unwrap();

    let restored = registry();
    restored.restore_snapshot(snapshot).unwrap();

    assert_eq!(restored.ticket_granting_ticket_count(), 2);
    assert_eq!(restored.service_ticket_count(), 2);
    let restored_pgt = restored.ticket_granting_ticket(pgt.id()).unwrap();
    assert_eq!(restored_pgt.parent_id(), Some(tgt.id()));
    assert_eq!(restored_pgt.state(), pgt.state());
    assert!(restored
        .with_service_ticket(&st, ServiceTicket::has_granted_ticket)
        .unwrap());

    let assertion = restored
        .validate_service_ticket_at(&proxied, &service(APP), t(4))
        .unwrap();
    assert_eq!(assertion.principal().id(), "alice");
    assert_eq!(assertion.chained_authentications().len(), 2);
}

#[test]
fn test_snapshot_keeps_urls_as_presented() {
    const PRESENTED: &str = "https://app.example.com/login;jsessionid=ABC123?x=1";
    const PROXY_PRESENTED: &str = "https://proxy.example.com/callback;jsessionid=Z";

    let source = registry();
    let tgt = source
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();
    let st = source
        .grant_service_ticket_at(tgt.id(), WebApplicationService::shared(PRESENTED), false, t(1))
        .unwrap();
    let proxy_st = source
        .grant_service_ticket_at(
            tgt.id(),
            WebApplicationService::shared(PROXY_PRESENTED),
            false,
            t(1),
        )
        .unwrap();
    let pgt = source
        .delegate_ticket_granting_ticket_at(&proxy_st, login(PROXY), t(2))
        .unwrap();

    let snapshot = source.snapshot();
    let st_record = snapshot
        .service_tickets
        .iter()
        .find(|record| record.id == st)
        .unwrap();
    assert_eq!(st_record.service, PRESENTED);

    let restored = registry();
    restored.restore_snapshot(snapshot).unwrap();

    let restored_tgt = restored.ticket_granting_ticket(tgt.id()).unwrap();
    let granted = restored_tgt.granted_services();
    assert_eq!(granted[0].1.original_url(), PRESENTED);
    assert_eq!(granted[0].1.id(), "https://app.example.com/login?x=1");
    let restored_pgt = restored.ticket_granting_ticket(pgt.id()).unwrap();
    assert_eq!(
        restored_pgt.proxied_by().unwrap().original_url(),
        PROXY_PRESENTED
    );

    let assertion = restored
        .validate_service_ticket_at(&st, &service("https://app.example.com/login?x=1"), t(3))
        .unwrap();
    assert_eq!(assertion.service().original_url(), PRESENTED);
}

#[test]
fn test_restore_refuses_registered_ids() {
    let registry = registry();
    let tgt = registry
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();

    let err = registry
        .restore(registry.export_ticket_granting_tickets(), Vec::new())
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState { ref ticket_id, .. } if ticket_id == tgt.id()));
}

#[test]
fn test_restored_orphan_is_rejected() {
    let source = registry();
    let tgt = source
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();
    let st = source
        .grant_service_ticket_at(tgt.id(), WebApplicationService::shared(APP), false, t(1))
        .unwrap();

    let restored = registry();
    restored
        .restore(Vec::new(), source.export_service_tickets())
        .unwrap();
    assert!(restored.contains_service_ticket(&st));

    let err = restored
        .validate_service_ticket_at(&st, &service(APP), t(2))
        .unwrap_err();
    assert!(matches!(err, Error::TicketExpired { .. }));
    assert!(!restored.contains_service_ticket(&st));
}

#[derive(Debug)]
struct FixedIds;

impl TicketIdGenerator for FixedIds {
    fn new_ticket_id(&self, kind: TicketKind) -> TicketId {
        TicketId::new_unchecked(format!("{}-fixed", kind.prefix()))
    }
}

#[test]
fn test_colliding_ids_are_refused() {
    let registry =
        TicketRegistry::with_id_generator(RegistryConfig::default(), Arc::new(FixedIds)).unwrap();

    registry
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();
    let err = registry
        .create_ticket_granting_ticket_at(login("bob"), t(0))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState { .. }));
    assert_eq!(registry.session_count(), 1);
}

#[test]
fn test_grant_collision_leaves_grantor_untouched() {
    let registry =
        TicketRegistry::with_id_generator(RegistryConfig::default(), Arc::new(FixedIds)).unwrap();
    let tgt = registry
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();
    let st = registry
        .grant_service_ticket_at(tgt.id(), WebApplicationService::shared(APP), false, t(1))
        .unwrap();

    let err = registry
        .grant_service_ticket_at(
            tgt.id(),
            WebApplicationService::shared(OTHER_APP),
            false,
            t(2),
        )
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState { .. }));

    assert_eq!(tgt.count_of_uses(), 1);
    assert_eq!(tgt.last_time_used(), t(1));
    let granted = tgt.granted_services();
    assert_eq!(granted.len(), 1);
    assert_eq!(granted[0].0, st);
    assert_eq!(granted[0].1.id(), APP);
}

#[test]
fn test_delegate_collision_keeps_ticket_delegable() {
    let registry =
        TicketRegistry::with_id_generator(RegistryConfig::default(), Arc::new(FixedIds)).unwrap();
    let tgt = registry
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();
    let st = registry
        .grant_service_ticket_at(tgt.id(), WebApplicationService::shared(PROXY), false, t(1))
        .unwrap();
    let squatter = TicketGrantingTicket::new_at(
        TicketId::new("PGT-fixed").unwrap(),
        login("mallory"),
        create_expiration_policy(&ExpirationPolicyConfig::ticket_granting_ticket_default())
            .unwrap(),
        t(1),
    );
    registry.add_ticket_granting_ticket(squatter).unwrap();

    let err = registry
        .delegate_ticket_granting_ticket_at(&st, login(PROXY), t(2))
        .unwrap_err();
    assert!(matches!(err, Error::InvalidState { .. }));
    assert_eq!(
        registry.with_service_ticket(&st, ServiceTicket::has_granted_ticket),
        Some(false)
    );

    let squatter = registry
        .ticket_granting_ticket(&TicketId::new_unchecked("PGT-fixed"))
        .unwrap();
    assert!(squatter.is_root());
    assert_eq!(squatter.authentication().principal().id(), "mallory");
}

#[rstest]
#[case::granting_ticket_twice(true)]
#[case::shared_between_kinds(false)]
fn test_restore_refuses_duplicate_records(#[case] granting_twice: bool) {
    let source = registry();
    let tgt = source
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();
    source
        .grant_service_ticket_at(tgt.id(), WebApplicationService::shared(APP), false, t(1))
        .unwrap();

    let mut granting = source.export_ticket_granting_tickets();
    let mut services = source.export_service_tickets();
    if granting_twice {
        granting.push(granting[0].clone());
    } else {
        services[0].id = tgt.id().clone();
    }

    let restored = registry();
    let err = restored.restore(granting, services).unwrap_err();
    assert!(matches!(err, Error::InvalidState { ref ticket_id, .. } if ticket_id == tgt.id()));
    assert_eq!(restored.ticket_granting_ticket_count(), 0);
    assert_eq!(restored.service_ticket_count(), 0);
}

#[test]
fn test_sub_second_policy_restores_with_registry_default() {
    let source = registry();
    let precise = TicketGrantingTicket::new_at(
        TicketId::new("TGT-precise").unwrap(),
        login("alice"),
        Arc::new(IdleTimeout::new(Duration::from_millis(1500))),
        t(0),
    );
    source.add_ticket_granting_ticket(precise).unwrap();

    let snapshot = source.snapshot();
    assert_eq!(snapshot.ticket_granting_tickets[0].policy, None);

    let restored = registry();
    restored.restore_snapshot(snapshot).unwrap();
    let ticket = restored
        .ticket_granting_ticket(&TicketId::new_unchecked("TGT-precise"))
        .unwrap();
    assert!(!ticket.is_expired_at(t(1) + chrono::Duration::milliseconds(200)));
    assert_eq!(
        ticket.expiration_policy().config(),
        Some(ExpirationPolicyConfig::ticket_granting_ticket_default())
    );
}

#[test]
fn test_invalid_stored_policy_restores_with_registry_default() {
    let source = registry();
    source
        .create_ticket_granting_ticket_at(login("alice"), t(0))
        .unwrap();
    let mut records = source.export_ticket_granting_tickets();
    records[0].policy = Some(ExpirationPolicyConfig::IdleTimeout {
        time_to_kill_secs: 0,
    });
    let id = records[0].id.clone();

    let restored = registry();
    restored.restore(records, Vec::new()).unwrap();
    let ticket = restored.ticket_granting_ticket(&id).unwrap();
    assert!(!ticket.is_expired_at(t(1)));
    assert_eq!(
        ticket.expiration_policy().config(),
        Some(ExpirationPolicyConfig::ticket_granting_ticket_default())
    );
}
