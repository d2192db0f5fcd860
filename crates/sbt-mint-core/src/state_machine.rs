use thiserror::Error;

/// What the mint button shows and whether it accepts clicks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MintControlState {
    #[default]
    Disconnected,
    Connected,
    Minting,
    Minted,
}

impl MintControlState {
    pub fn label(self) -> &'static str {
        match self {
            Self::Disconnected => "Connect Wallet",
            Self::Connected => "Mint SBT",
            Self::Minting => "Minting...",
            Self::Minted => "Minted ✓",
        }
    }

    pub fn is_enabled(self) -> bool {
        matches!(self, Self::Disconnected | Self::Connected)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlAction {
    Connect,
    Disconnect,
    SubmitMint,
    MintConfirmed,
    MintFailed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StateTransition {
    pub from: MintControlState,
    pub to: MintControlState,
    pub reason: &'static str,
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("illegal mint control transition: {from:?} --{action:?}-->")]
pub struct TransitionError {
    pub from: MintControlState,
    pub action: ControlAction,
}

pub fn control_transition(
    from: MintControlState,
    action: ControlAction,
) -> Result<(MintControlState, StateTransition), TransitionError> {
    use ControlAction as A;
    use MintControlState as S;

    let (to, reason) = match (from, action) {
        (_, A::Disconnect) => (S::Disconnected, "wallet disconnected"),
        (S::Disconnected | S::Connected, A::Connect) => (S::Connected, "session established"),
        (S::Minted, A::Connect) => (S::Minted, "minted control stays terminal"),
        (S::Connected, A::SubmitMint) => (S::Minting, "mint submitted"),
        (S::Minting, A::MintConfirmed) => (S::Minted, "receipt status 1"),
        (S::Minting, A::MintFailed) => (S::Connected, "mint failed"),
        _ => return Err(TransitionError { from, action }),
    };
    Ok((to, StateTransition { from, to, reason }))
}
