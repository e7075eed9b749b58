use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

pub const HEX_PREFIX: &str = "0x";
/// `0x` followed by 32 bytes of hex.
pub const HEX_ID_LEN: usize = 66;

/// Checks the textual shape of an object id, address or package id.
pub fn is_well_formed_hex_id(candidate: &str) -> bool {
    candidate.len() == HEX_ID_LEN
        && candidate
            .strip_prefix(HEX_PREFIX)
            .is_some_and(|hex| hex.bytes().all(|b| b.is_ascii_hexdigit()))
}

macro_rules! string_newtype {
    ($name:ident) => {
        #[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub String);

        impl $name {
            pub fn new(value: impl Into<String>) -> Self {
                Self(value.into())
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

string_newtype!(ObjectId);
string_newtype!(Address);
string_newtype!(PackageId);
string_newtype!(TransactionDigest);

impl ObjectId {
    /// Adopts a persisted candidate only when it is a well-formed id.
    ///
    /// Validation is purely syntactic; nothing is fetched to confirm that the
    /// object exists.
    pub fn parse_candidate(candidate: &str) -> Option<Self> {
        is_well_formed_hex_id(candidate).then(|| Self(candidate.to_string()))
    }

    /// Reads a candidate out of a location fragment such as `#0x…`.
    ///
    /// Only text after the `#` marker counts; a bare id is not a fragment.
    pub fn from_fragment(location: &str) -> Option<Self> {
        location
            .strip_prefix('#')
            .and_then(Self::parse_candidate)
    }

    pub fn to_fragment(&self) -> String {
        format!("#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Network {
    Localnet,
    Devnet,
    Testnet,
    Mainnet,
}

impl Network {
    pub const ALL: [Network; 4] = [
        Network::Localnet,
        Network::Devnet,
        Network::Testnet,
        Network::Mainnet,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Network::Localnet => "localnet",
            Network::Devnet => "devnet",
            Network::Testnet => "testnet",
            Network::Mainnet => "mainnet",
        }
    }

    pub fn default_rpc_url(self) -> &'static str {
        match self {
            Network::Localnet => "http://127.0.0.1:9000",
            Network::Devnet => "https://fullnode.devnet.sui.io:443",
            Network::Testnet => "https://fullnode.testnet.sui.io:443",
            Network::Mainnet => "https://fullnode.mainnet.sui.io:443",
        }
    }
}

impl fmt::Display for Network {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Network {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Network::ALL
            .into_iter()
            .find(|network| network.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown network '{s}'"))
    }
}

/// The mutating entry points offered on a resolved counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CounterAction {
    Increment,
    Decrement,
    Reset,
}

impl CounterAction {
    pub const ALL: [CounterAction; 3] = [
        CounterAction::Increment,
        CounterAction::Decrement,
        CounterAction::Reset,
    ];

    pub fn entry_point(self) -> &'static str {
        match self {
            CounterAction::Increment => "increment",
            CounterAction::Decrement => "decrement",
            CounterAction::Reset => "reset",
        }
    }

    pub fn idle_label(self) -> &'static str {
        match self {
            CounterAction::Increment => "Increment",
            CounterAction::Decrement => "Decrement",
            CounterAction::Reset => "Reset",
        }
    }

    pub fn busy_label(self) -> &'static str {
        match self {
            CounterAction::Increment => "Increasing Count",
            CounterAction::Decrement => "Decreasing Count",
            CounterAction::Reset => "Resetting Count",
        }
    }
}

impl fmt::Display for CounterAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.entry_point())
    }
}

/// The action currently in flight, if any.
pub type PendingAction = Option<CounterAction>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CounterSnapshot {
    pub value: u64,
    pub owner: Address,
}

impl CounterSnapshot {
    pub fn is_owned_by(&self, identity: Option<&Address>) -> bool {
        identity.is_some_and(|identity| *identity == self.owner)
    }
}

#[cfg(test)]
#[path = "tests/domain_tests.rs"]
mod tests;
