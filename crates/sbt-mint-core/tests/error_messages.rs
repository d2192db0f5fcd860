use sbt_mint_core::{parse_error, PortError, ProviderError, ERROR_MESSAGES, UNKNOWN_ERROR};

fn reason(text: &str) -> ProviderError {
    ProviderError {
        reason: Some(text.to_owned()),
        ..ProviderError::default()
    }
}

#[test]
fn user_rejection_reason_maps_to_cancelled() {
    let err = ProviderError {
        code: Some(4001),
        reason: Some("User rejected the request".to_owned()),
        message: Some("ethers-user-denied: MetaMask Tx Signature".to_owned()),
    };
    assert_eq!(parse_error(&err), "Transaction cancelled by user");
}

#[test]
fn every_table_key_matches_case_insensitively() {
    for (key, friendly) in ERROR_MESSAGES {
        let shouted = format!("execution reverted: {}", key.to_uppercase());
        assert_eq!(parse_error(&reason(&shouted)), *friendly);
        let err = ProviderError::with_message(format!("prefix {key} suffix"));
        assert_eq!(parse_error(&err), *friendly);
    }
}

#[test]
fn first_matching_entry_wins() {
    let err = reason("insufficient funds for gas * price + value: network base");
    assert_eq!(parse_error(&err), "Insufficient ETH balance");
    let err = reason("network says: user rejected");
    assert_eq!(parse_error(&err), "Transaction cancelled by user");
}

#[test]
fn reason_takes_precedence_over_message_for_matching() {
    let err = ProviderError {
        code: None,
        reason: Some("execution reverted: paused".to_owned()),
        message: Some("user rejected".to_owned()),
    };
    assert_eq!(parse_error(&err), "execution reverted: paused");
}

#[test]
fn empty_reason_falls_through_to_message() {
    let err = ProviderError {
        code: None,
        reason: Some(String::new()),
        message: Some("Already Minted".to_owned()),
    };
    assert_eq!(parse_error(&err), "You have already minted");
}

#[test]
fn unmatched_errors_fall_back_to_raw_text() {
    let err = ProviderError {
        code: None,
        reason: Some("execution reverted: paused".to_owned()),
        message: Some("call exception".to_owned()),
    };
    assert_eq!(parse_error(&err), "execution reverted: paused");
    assert_eq!(
        parse_error(&ProviderError::with_message("call exception")),
        "call exception"
    );
    assert_eq!(parse_error(&ProviderError::default()), UNKNOWN_ERROR);
}

#[test]
fn transport_failures_read_as_network_errors() {
    let err = PortError::Transport("connection refused".to_owned());
    assert_eq!(
        parse_error(&err.to_provider_error()),
        "Network error - please try again"
    );
}

#[test]
fn provider_errors_keep_their_code() {
    let err: PortError = ProviderError::with_code(4902, "Unrecognized chain ID").into();
    assert_eq!(err.provider_code(), Some(4902));
    assert_eq!(err.to_provider_error().code, Some(4902));
    assert_eq!(PortError::Policy("x".to_owned()).provider_code(), None);
}
