use super::*;
use crate::adapter::{
    BuiltTransaction, InitData, Network, TransactionAdapter, TransactionBody, TransactionOutcome,
    build_action,
};
use crate::reader::StaticCapabilityReader;
use async_trait::async_trait;
use capability::{AccessKind, Capability, Coin, CoinCapabilities};
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

const TOKEN: &str = "0.0.100";
const OPERATOR: &str = "0.0.500";

/// Counts submissions and records what each one carried.
struct MockAdapter {
    submissions: Arc<AtomicUsize>,
    seen: Arc<Mutex<Vec<(Operation, AccessKind)>>>,
}

impl MockAdapter {
    fn new() -> (Self, Arc<AtomicUsize>, Arc<Mutex<Vec<(Operation, AccessKind)>>>) {
        let submissions = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(Vec::new()));
        (
            Self {
                submissions: submissions.clone(),
                seen: seen.clone(),
            },
            submissions,
            seen,
        )
    }
}

#[async_trait]
impl TransactionAdapter for MockAdapter {
    async fn register(&self) -> crate::Result<InitData> {
        Ok(InitData {
            account: OPERATOR.parse().unwrap(),
            network: Network::Testnet,
        })
    }

    async fn stop(&self) -> crate::Result<()> {
        Ok(())
    }

    fn account(&self) -> AccountId {
        OPERATOR.parse().unwrap()
    }

    fn network(&self) -> Network {
        Network::Testnet
    }

    fn build(
        &self,
        operation: Operation,
        call: &OperationCall,
    ) -> crate::Result<BuiltTransaction> {
        self.seen.lock().unwrap().push((operation, call.access));
        Ok(BuiltTransaction::Unsigned(TransactionBody::new(
            self.account(),
            self.network(),
            build_action(operation, call)?,
        )))
    }

    async fn sign_and_send(&self, _: BuiltTransaction) -> crate::Result<TransactionOutcome> {
        self.submissions.fetch_add(1, Ordering::SeqCst);
        Ok(TransactionOutcome::success("0.0.500@1234567"))
    }
}

fn capabilities(grants: Vec<Capability>) -> CoinCapabilities {
    CoinCapabilities::new(
        Coin {
            token: TOKEN.parse().unwrap(),
            contract: Some("0.0.200".parse().unwrap()),
            decimals: 2,
        },
        OPERATOR.parse().unwrap(),
        grants,
    )
    .unwrap()
}

async fn session_with(
    grants: Vec<Capability>,
    balance: &str,
) -> (Arc<NetworkSession>, Arc<AtomicUsize>, Arc<Mutex<Vec<(Operation, AccessKind)>>>) {
    let reader = StaticCapabilityReader::new()
        .with_capabilities(capabilities(grants))
        .with_balance(
            TOKEN.parse().unwrap(),
            Amount::parse(balance, 2).unwrap(),
        );
    let session = Arc::new(NetworkSession::new(Arc::new(reader)));
    let (adapter, submissions, seen) = MockAdapter::new();
    session.connect(Box::new(adapter)).await.unwrap();
    (session, submissions, seen)
}

fn handler_code(err: bus::Error) -> &'static str {
    match err {
        bus::Error::Handler(e) => e.code,
        other => panic!("unexpected error: {other}"),
    }
}

#[tokio::test]
async fn granted_native_operation_submits_on_native_path() {
    let (session, submissions, seen) =
        session_with(vec![Capability::native(Operation::CashIn)], "0").await;
    let bus = command_bus(session).unwrap();

    let outcome = bus
        .execute(CashInRequest {
            token: TOKEN.into(),
            target: "0.0.300".into(),
            amount: "5.25".into(),
        })
        .await
        .unwrap();

    assert!(outcome.is_success());
    assert_eq!(submissions.load(Ordering::SeqCst), 1);
    assert_eq!(
        *seen.lock().unwrap(),
        vec![(Operation::CashIn, AccessKind::Native)]
    );
}

#[tokio::test]
async fn granted_contract_operation_takes_contract_path() {
    let (session, _, seen) =
        session_with(vec![Capability::contract(Operation::Burn)], "0").await;
    let bus = command_bus(session).unwrap();

    bus.execute(BurnRequest {
        token: TOKEN.into(),
        amount: "1.00".into(),
    })
    .await
    .unwrap();

    assert_eq!(
        *seen.lock().unwrap(),
        vec![(Operation::Burn, AccessKind::Contract)]
    );
}

#[tokio::test]
async fn absent_grant_refuses_before_the_backend() {
    let (session, submissions, _) =
        session_with(vec![Capability::native(Operation::CashIn)], "0").await;
    let bus = command_bus(session).unwrap();

    let err = bus
        .execute(WipeRequest {
            token: TOKEN.into(),
            target: "0.0.300".into(),
            amount: "1.00".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(handler_code(err), "operation_not_allowed");
    assert_eq!(submissions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn invalid_request_fails_validation_without_any_read() {
    let (session, submissions, _) = session_with(vec![], "0").await;
    let bus = command_bus(session).unwrap();

    let err = bus
        .execute(PauseRequest {
            token: "junk".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(handler_code(err), "validation_failed");
    assert_eq!(submissions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rescue_above_treasury_balance_is_refused() {
    let (session, submissions, _) =
        session_with(vec![Capability::native(Operation::Rescue)], "10.00").await;
    let bus = command_bus(session).unwrap();

    let err = bus
        .execute(RescueRequest {
            token: TOKEN.into(),
            amount: "10.01".into(),
        })
        .await
        .unwrap_err();

    assert_eq!(handler_code(err), "operation_not_allowed");
    assert_eq!(submissions.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn rescue_within_treasury_balance_submits() {
    let (session, submissions, _) =
        session_with(vec![Capability::native(Operation::Rescue)], "10.00").await;
    let bus = command_bus(session).unwrap();

    bus.execute(RescueRequest {
        token: TOKEN.into(),
        amount: "10.00".into(),
    })
    .await
    .unwrap();

    assert_eq!(submissions.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn role_grant_walks_targets_in_order() {
    let (session, submissions, seen) =
        session_with(vec![Capability::contract(Operation::GrantRole)], "0").await;
    let bus = command_bus(session).unwrap();

    let outcomes = bus
        .execute(GrantRoleRequest {
            token: TOKEN.into(),
            role: capability::Role::CashIn,
            targets: vec!["0.0.301".into(), "0.0.302".into(), "0.0.303".into()],
            amounts: vec!["1".into(), "2".into(), "3".into()],
        })
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 3);
    assert_eq!(submissions.load(Ordering::SeqCst), 3);
    assert!(seen
        .lock()
        .unwrap()
        .iter()
        .all(|(op, access)| *op == Operation::GrantRole && *access == AccessKind::Contract));
}

#[tokio::test]
async fn capability_query_returns_the_fresh_read() {
    let grants = vec![
        Capability::native(Operation::CashIn),
        Capability::contract(Operation::Freeze),
    ];
    let (session, _, _) = session_with(grants, "0").await;
    let bus = query_bus(session).unwrap();

    let read = bus
        .execute(GetCapabilitiesRequest {
            token: TOKEN.into(),
        })
        .await
        .unwrap();

    assert_eq!(read.capabilities().len(), 2);
    assert_eq!(read.coin.decimals, 2);
}

#[test]
fn command_bus_binds_every_operation() {
    let session = Arc::new(NetworkSession::new(Arc::new(StaticCapabilityReader::new())));
    let bus = command_bus(session.clone()).unwrap();
    assert!(bus.is_bound::<CashInRequest>());
    assert!(bus.is_bound::<BurnRequest>());
    assert!(bus.is_bound::<WipeRequest>());
    assert!(bus.is_bound::<FreezeRequest>());
    assert!(bus.is_bound::<UnfreezeRequest>());
    assert!(bus.is_bound::<PauseRequest>());
    assert!(bus.is_bound::<UnpauseRequest>());
    assert!(bus.is_bound::<DeleteRequest>());
    assert!(bus.is_bound::<RescueRequest>());
    assert!(bus.is_bound::<GrantRoleRequest>());
    assert!(bus.is_bound::<RevokeRoleRequest>());
    assert!(!bus.is_bound::<GetCapabilitiesRequest>());

    let queries = query_bus(session).unwrap();
    assert!(queries.is_bound::<GetCapabilitiesRequest>());
}
