use std::collections::BTreeMap;

use chrono::{TimeZone, Utc};
use proptest::prelude::*;

use engine::{
    CASH_WALLET_ID, LedgerAction, MarginType, Transaction, TransactionDraft, TxType, WalletDeltas,
    compute_wallet_delta, reconcile_edit,
    transfer::{
        TransferPair, TransferRequest, transfer_create_deltas, transfer_delete_deltas,
        transfer_legs,
    },
};

const DESCRIPTIONS: &[&str] = &[
    "Reward: Payung",
    "Pindah Saldo",
    "Fee Brilink",
    "Penarikan Margin Maret",
    "Tarik Tunai",
    "Penyesuaian Kas",
    "Tambah Modal",
    "Bunga Bank",
    "Potongan Bank",
    "Pulsa",
];

const WALLETS: &[&str] = &["CASH", "BRI", "DANA", ""];
const TRANSFER_WALLETS: &[&str] = &["CASH", "BRI", "DANA"];

fn arb_transaction() -> impl Strategy<Value = Transaction> {
    (
        prop::sample::select(DESCRIPTIONS),
        any::<bool>(),
        0i64..10_000_000,
        0i64..1_000_000,
        prop::sample::select(WALLETS),
        any::<bool>(),
        prop::option::of(prop_oneof![Just(MarginType::Dalam), Just(MarginType::Luar)]),
        any::<bool>(),
    )
        .prop_map(
            |(description, is_in, amount, margin, wallet, piutang, margin_type, internal)| {
                let tx_type = if is_in { TxType::In } else { TxType::Out };
                let mut draft = TransactionDraft::new(description, tx_type, amount, wallet)
                    .margin(margin)
                    .piutang(piutang);
                draft.margin_type = margin_type;
                if internal {
                    draft = draft.internal_transfer("tr");
                }
                Transaction::from_draft("tx", Utc.timestamp_opt(1_700_000_000, 0).unwrap(), draft)
            },
        )
}

fn apply(balances: &mut BTreeMap<String, i64>, deltas: &WalletDeltas) {
    for (wallet_id, delta) in deltas.iter() {
        *balances.entry(wallet_id.to_string()).or_default() += delta;
    }
}

fn non_zero(balances: BTreeMap<String, i64>) -> BTreeMap<String, i64> {
    balances.into_iter().filter(|(_, v)| *v != 0).collect()
}

proptest! {
    #[test]
    fn delete_negates_create(tx in arb_transaction()) {
        let create = compute_wallet_delta(&tx, LedgerAction::Create);
        let delete = compute_wallet_delta(&tx, LedgerAction::Delete);
        prop_assert_eq!(&create.primary_wallet_id, &delete.primary_wallet_id);
        prop_assert_eq!(create.primary_delta, -delete.primary_delta);
        prop_assert_eq!(create.cash_delta, -delete.cash_delta);
    }

    #[test]
    fn edit_equals_delete_then_create(original in arb_transaction(), updated in arb_transaction()) {
        let mut reconciled = BTreeMap::new();
        apply(&mut reconciled, &reconcile_edit(&original, &updated));

        let mut sequential = BTreeMap::new();
        apply(&mut sequential, &WalletDeltas::from(&compute_wallet_delta(&original, LedgerAction::Delete)));
        apply(&mut sequential, &WalletDeltas::from(&compute_wallet_delta(&updated, LedgerAction::Create)));

        prop_assert_eq!(non_zero(reconciled), non_zero(sequential));
    }

    #[test]
    fn editing_to_itself_is_a_noop(tx in arb_transaction()) {
        prop_assert!(reconcile_edit(&tx, &tx).pruned().is_empty());
    }

    #[test]
    fn transfer_moves_exactly_amount_plus_fee(
        amount in 1i64..10_000_000,
        fee in 0i64..50_000,
        from in prop::sample::select(TRANSFER_WALLETS),
        to in prop::sample::select(TRANSFER_WALLETS),
    ) {
        prop_assume!(from != to);
        let request = TransferRequest::new(from, to, amount).fee(fee);
        let (out_draft, in_draft) = transfer_legs(&request, "tr");
        let date = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        let pair = TransferPair {
            out_leg: Transaction::from_draft("out", date, out_draft),
            in_leg: Transaction::from_draft("in", date, in_draft),
        };

        let created = transfer_create_deltas(&request);
        prop_assert_eq!(created.get(from), -(amount + fee));
        prop_assert_eq!(created.get(to), amount);
        prop_assert_eq!(created.len(), 2);
        if from != CASH_WALLET_ID && to != CASH_WALLET_ID {
            prop_assert_eq!(created.get(CASH_WALLET_ID), 0);
        }

        let mut balances = BTreeMap::new();
        apply(&mut balances, &created);
        apply(&mut balances, &transfer_delete_deltas(&pair));
        prop_assert!(non_zero(balances).is_empty());
    }
}
