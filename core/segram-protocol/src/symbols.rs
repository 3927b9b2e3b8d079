use bitflags::{bitflags, Flags};
use core::fmt;
use nom::{
    bytes::complete::take_while1,
    character::complete::char,
    combinator::{all_consuming, opt},
    multi::separated_list1,
    sequence::pair,
    IResult,
};
use rkyv::{Archive, Deserialize, Serialize};
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize as SerdeDeserialize, Serialize as SerdeSerialize};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SymbolError {
    #[error("unknown {kind} symbol '{name}'")]
    Unknown { kind: &'static str, name: String },
    #[error("malformed {kind} expression '{text}'")]
    Malformed { kind: &'static str, text: String },
}

/// A named bitset whose members can be written as `a|b|c`, optionally
/// negated with a leading `~`.
pub trait Symbol: Flags + Copy + 'static {
    /// Human readable name of the symbol family, used in errors.
    const KIND: &'static str;

    /// Lowercase member names joined with `|`; empty for the empty set.
    fn label(&self) -> String {
        self.iter_names()
            .map(|(name, _)| name.to_ascii_lowercase())
            .collect::<Vec<_>>()
            .join("|")
    }

    /// Parses a label back into a bitset. Matching is case-insensitive.
    fn parse(text: &str) -> Result<Self, SymbolError> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(Self::empty());
        }
        let (_, (negated, names)) = expression(text).map_err(|_| SymbolError::Malformed {
            kind: Self::KIND,
            text: text.to_string(),
        })?;

        let mut value = Self::empty();
        for name in names {
            let flag = <Self as Flags>::from_name(&name.to_ascii_uppercase()).ok_or_else(|| {
                SymbolError::Unknown {
                    kind: Self::KIND,
                    name: name.to_string(),
                }
            })?;
            value = value.union(flag);
        }
        Ok(if negated.is_some() { value.complement() } else { value })
    }
}

fn member(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_')(input)
}

fn expression(input: &str) -> IResult<&str, (Option<char>, Vec<&str>)> {
    all_consuming(pair(opt(char('~')), separated_list1(char('|'), member)))(input)
}

macro_rules! impl_symbol {
    ($name:ident, $kind:literal) => {
        impl Symbol for $name {
            const KIND: &'static str = $kind;
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.label())
            }
        }
    };
}

// rkyv support: archived as the raw bits, unknown bits dropped on load.
macro_rules! archive_bits {
    ($name:ident) => {
        impl Archive for $name {
            type Archived = u32;
            type Resolver = ();

            unsafe fn resolve(&self, _pos: usize, _resolver: Self::Resolver, out: *mut Self::Archived) {
                out.write(self.bits());
            }
        }

        impl<S: rkyv::ser::Serializer + ?Sized> Serialize<S> for $name {
            fn serialize(&self, _serializer: &mut S) -> Result<Self::Resolver, S::Error> {
                Ok(())
            }
        }

        impl<D: rkyv::Fallible + ?Sized> Deserialize<$name, D> for u32 {
            fn deserialize(&self, _deserializer: &mut D) -> Result<$name, D::Error> {
                Ok($name::from_bits_truncate(*self))
            }
        }
    };
}

bitflags! {
    /// Universal Dependencies coarse part-of-speech tags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
    pub struct Pos: u32 {
        // Open class words
        const ADJ   = 1 << 0;
        const ADV   = 1 << 1;
        const INTJ  = 1 << 2;
        const NOUN  = 1 << 3;
        const PROPN = 1 << 4;
        const VERB  = 1 << 5;
        // Closed class words
        const ADP   = 1 << 6;
        const AUX   = 1 << 7;
        const CCONJ = 1 << 8;
        const DET   = 1 << 9;
        const NUM   = 1 << 10;
        const PART  = 1 << 11;
        const PRON  = 1 << 12;
        const SCONJ = 1 << 13;
        // Other
        const PUNCT = 1 << 14;
        const SYM   = 1 << 15;
        const X     = 1 << 16;
        const SPACE = 1 << 17;
    }
}

bitflags! {
    /// Syntactic roles of tokens within components.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
    pub struct Role: u32 {
        // Component-specific roles
        const VERB   = 1 << 0;
        const NOUN   = 1 << 1;
        const SUBJ   = 1 << 2;
        const DOBJ   = 1 << 3;
        const IOBJ   = 1 << 4;
        const PREP   = 1 << 5;
        const POBJ   = 1 << 6;
        const PROOT  = 1 << 7;
        const DESC   = 1 << 8;
        const BG     = 1 << 9;
        // Fixed roles
        const NEG    = 1 << 10;
        const QMARK  = 1 << 11;
        const EXCLAM = 1 << 12;
        const INTJ   = 1 << 13;
    }
}

bitflags! {
    /// Relations between a phrase and its parent.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
    pub struct Dep: u32 {
        const ROOT  = 1 << 0;
        const SUBJ  = 1 << 1;
        const DOBJ  = 1 << 2;
        const IOBJ  = 1 << 3;
        const POBJ  = 1 << 4;
        const PREP  = 1 << 5;
        const SUBCL = 1 << 6;
        const RELCL = 1 << 7;
        const ACL   = 1 << 8;
        const XCOMP = 1 << 9;
        const DESC  = 1 << 10;
        const ADESC = 1 << 11;
        const CDESC = 1 << 12;
        const NMOD  = 1 << 13;
        const APPOS = 1 << 14;
        const AGENT = 1 << 15;
        const CONJ  = 1 << 16;
        const MISC  = 1 << 17;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
    pub struct Tense: u32 {
        const PAST    = 1 << 0;
        const PRESENT = 1 << 1;
        const FUTURE  = 1 << 2;
    }
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
    pub struct Modal: u32 {
        const NULL        = 1 << 0;
        const ABILITY     = 1 << 1;
        const POSSIBILITY = 1 << 2;
        const NECESSITY   = 1 << 3;
        const OBLIGATION  = 1 << 4;
        const NEED        = 1 << 5;
    }
}

bitflags! {
    /// Grammatical mood: indicative (realis) or imperative.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
    #[cfg_attr(feature = "serde", derive(SerdeDeserialize, SerdeSerialize))]
    pub struct Mood: u32 {
        const REAL = 1 << 0;
        const IMP  = 1 << 1;
    }
}

impl_symbol!(Pos, "pos");
impl_symbol!(Role, "role");
impl_symbol!(Dep, "dep");
impl_symbol!(Tense, "tense");
impl_symbol!(Modal, "modal");
impl_symbol!(Mood, "mood");

archive_bits!(Pos);

impl Dep {
    /// Role a phrase plays when attached with this relation.
    /// For composite relations the first member with a role wins.
    pub fn role(self) -> Option<Role> {
        self.iter().find_map(|flag| {
            if flag == Dep::SUBJ {
                Some(Role::SUBJ)
            } else if flag == Dep::DOBJ {
                Some(Role::DOBJ)
            } else if flag == Dep::IOBJ {
                Some(Role::IOBJ)
            } else if flag == Dep::POBJ {
                Some(Role::POBJ)
            } else if flag.intersects(Dep::DESC | Dep::ADESC | Dep::CDESC) {
                Some(Role::DESC)
            } else if flag.intersects(Dep::SUBCL | Dep::RELCL | Dep::ACL) {
                Some(Role::VERB)
            } else if flag.intersects(Dep::NMOD | Dep::APPOS) {
                Some(Role::NOUN)
            } else if flag.intersects(Dep::AGENT | Dep::PREP) {
                Some(Role::PREP)
            } else {
                None
            }
        })
    }
}
