//! Token intern table.
//!
//! Every token text that reaches the tree is interned once. Strings are
//! leaked to `'static`; the table lives as long as the compilation does.

use parking_lot::RwLock;
use rustc_hash::FxHashMap;

use crate::Name;

/// Error when interning a string fails.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InternError {
    /// More than `u32::MAX` distinct strings.
    Overflow { count: usize },
}

impl std::fmt::Display for InternError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            InternError::Overflow { count } => write!(
                f,
                "token table exceeded capacity: {count} strings, max is {}",
                u32::MAX
            ),
        }
    }
}

impl std::error::Error for InternError {}

struct InternTable {
    map: FxHashMap<&'static str, u32>,
    strings: Vec<&'static str>,
}

/// Interns token texts so that equal texts compare by index.
pub struct StringInterner {
    table: RwLock<InternTable>,
}

impl StringInterner {
    pub fn new() -> Self {
        let empty: &'static str = "";
        let mut map = FxHashMap::default();
        map.insert(empty, 0);
        StringInterner {
            table: RwLock::new(InternTable {
                map,
                strings: vec![empty],
            }),
        }
    }

    /// Try to intern a string, returning its Name or an error on overflow.
    pub fn try_intern(&self, s: &str) -> Result<Name, InternError> {
        {
            let guard = self.table.read();
            if let Some(&index) = guard.map.get(s) {
                return Ok(Name::from_raw(index));
            }
        }

        let mut guard = self.table.write();
        if let Some(&index) = guard.map.get(s) {
            return Ok(Name::from_raw(index));
        }

        let index = u32::try_from(guard.strings.len()).map_err(|_| InternError::Overflow {
            count: guard.strings.len(),
        })?;
        let leaked: &'static str = Box::leak(s.to_owned().into_boxed_str());
        guard.strings.push(leaked);
        guard.map.insert(leaked, index);
        Ok(Name::from_raw(index))
    }

    /// Intern a string, returning its Name.
    ///
    /// # Panics
    /// Panics if more than `u32::MAX` distinct strings are interned.
    #[inline]
    pub fn intern(&self, s: &str) -> Name {
        self.try_intern(s).unwrap_or_else(|e| panic!("{}", e))
    }

    /// Look up a previously interned name without inserting.
    pub fn get(&self, s: &str) -> Option<Name> {
        self.table.read().map.get(s).map(|&index| Name::from_raw(index))
    }

    /// Text of an interned name. Unknown names resolve to the empty string.
    pub fn lookup(&self, name: Name) -> &'static str {
        self.table
            .read()
            .strings
            .get(name.raw() as usize)
            .copied()
            .unwrap_or("")
    }

    pub fn len(&self) -> usize {
        self.table.read().strings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for StringInterner {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for StringInterner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StringInterner")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests;
