use super::*;

const VALID_ID: &str = "0xd02169b249fefd7dc89c8cd3ad2666ef085163cb99fae199a0f08d795712af9f";

#[test]
fn adopts_well_formed_id_after_fragment_marker() {
    assert_eq!(
        ObjectId::from_fragment(&format!("#{VALID_ID}")),
        Some(ObjectId::new(VALID_ID))
    );
}

#[test]
fn bare_id_without_fragment_marker_is_not_adopted() {
    assert_eq!(ObjectId::from_fragment(VALID_ID), None);
    assert_eq!(ObjectId::parse_candidate(VALID_ID), Some(ObjectId::new(VALID_ID)));
}

#[test]
fn rejects_malformed_candidates() {
    let too_short = format!("#{}", &VALID_ID[..65]);
    let no_prefix = format!("#00{}", &VALID_ID[2..]);
    let non_hex = format!("#0x{}", "g".repeat(64));

    for candidate in [
        "",
        "#",
        "#0xINVALID",
        too_short.as_str(),
        no_prefix.as_str(),
        non_hex.as_str(),
    ] {
        assert_eq!(ObjectId::from_fragment(candidate), None, "{candidate}");
    }
}

#[test]
fn fragment_round_trips_through_location() {
    let id = ObjectId::new(VALID_ID);
    assert_eq!(ObjectId::from_fragment(&id.to_fragment()), Some(id));
}

#[test]
fn parses_networks_case_insensitively() {
    assert_eq!("Testnet".parse::<Network>(), Ok(Network::Testnet));
    assert_eq!(" mainnet ".parse::<Network>(), Ok(Network::Mainnet));
    assert!("betanet".parse::<Network>().is_err());
}

#[test]
fn ownership_requires_a_connected_identity() {
    let snapshot = CounterSnapshot {
        value: 5,
        owner: Address::new("0xAAA"),
    };
    assert!(snapshot.is_owned_by(Some(&Address::new("0xAAA"))));
    assert!(!snapshot.is_owned_by(Some(&Address::new("0xBBB"))));
    assert!(!snapshot.is_owned_by(None));
}

#[test]
fn action_labels_match_button_text() {
    assert_eq!(CounterAction::Increment.busy_label(), "Increasing Count");
    assert_eq!(CounterAction::Decrement.busy_label(), "Decreasing Count");
    assert_eq!(CounterAction::Reset.busy_label(), "Resetting Count");
    assert_eq!(CounterAction::Reset.entry_point(), "reset");
}
