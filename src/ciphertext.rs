// Ciphertext made of RSA-encrypted letter blocks with the surrounding
// punctuation and spacing kept verbatim.
use std::collections::HashSet;
use std::convert::Infallible;
use std::fmt;
use std::str::FromStr;

use num_bigint::BigUint;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CipherElement {
    /// One encrypted letter.
    Block(BigUint),
    /// A character that was not encrypted. It also breaks n-gram runs.
    Passthrough(char),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Ciphertext {
    elements: Vec<CipherElement>,
}

impl Ciphertext {
    pub fn new(elements: Vec<CipherElement>) -> Self {
        Self { elements }
    }

    pub fn elements(&self) -> &[CipherElement] {
        &self.elements
    }

    pub fn blocks(&self) -> impl Iterator<Item = &BigUint> {
        self.elements.iter().filter_map(|element| match element {
            CipherElement::Block(block) => Some(block),
            CipherElement::Passthrough(_) => None,
        })
    }

    pub fn block_count(&self) -> usize {
        self.blocks().count()
    }

    /// Distinct blocks in order of first appearance.
    pub fn unique_blocks(&self) -> Vec<&BigUint> {
        let mut seen = HashSet::new();
        self.blocks().filter(|block| seen.insert(*block)).collect()
    }

    pub fn contains_block(&self, block: &BigUint) -> bool {
        self.blocks().any(|b| b == block)
    }

    /// Maximal stretches of consecutive blocks, split at passthrough elements.
    pub fn block_runs(&self) -> Vec<Vec<&BigUint>> {
        let mut runs = Vec::new();
        let mut current = Vec::new();
        for element in &self.elements {
            match element {
                CipherElement::Block(block) => current.push(block),
                CipherElement::Passthrough(_) => {
                    if !current.is_empty() {
                        runs.push(std::mem::take(&mut current));
                    }
                }
            }
        }
        if !current.is_empty() {
            runs.push(current);
        }
        runs
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }
}

impl FromIterator<CipherElement> for Ciphertext {
    fn from_iter<T: IntoIterator<Item = CipherElement>>(iter: T) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl fmt::Display for Ciphertext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for element in &self.elements {
            match element {
                CipherElement::Block(block) => write!(f, "[{block}]")?,
                CipherElement::Passthrough(ch) => write!(f, "{ch}")?,
            }
        }
        Ok(())
    }
}

/// Parses the form written by `Display`: `[digits]` is a block and every other
/// character passes through, including a `[` that does not open a well formed
/// block.
impl FromStr for Ciphertext {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let chars: Vec<char> = s.chars().collect();
        let mut elements = Vec::new();
        let mut idx = 0;
        while idx < chars.len() {
            if chars[idx] == '[' {
                let digits = chars[idx + 1..]
                    .iter()
                    .take_while(|c| c.is_ascii_digit())
                    .count();
                let close = idx + 1 + digits;
                if digits > 0 && chars.get(close) == Some(&']') {
                    let number: String = chars[idx + 1..close].iter().collect();
                    if let Ok(block) = number.parse::<BigUint>() {
                        elements.push(CipherElement::Block(block));
                        idx = close + 1;
                        continue;
                    }
                }
            }
            elements.push(CipherElement::Passthrough(chars[idx]));
            idx += 1;
        }
        Ok(Self::new(elements))
    }
}
