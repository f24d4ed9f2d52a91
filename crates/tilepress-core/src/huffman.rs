//! Huffman entropy coding over the quantized byte stream.
//!
//! A fresh prefix code is built per compression call from the byte
//! frequencies of that call's quantized stream; the resulting decode table
//! travels inside the container, so a decoder never has to reconstruct the
//! tree from side information. Frequency ties during tree construction are
//! broken by insertion order, which keeps the build deterministic.

use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

use bitvec::prelude::*;

use crate::error::CodecError;

/// A variable-length prefix-free bit pattern, most significant bit first.
pub type Code = BitVec<u8, Msb0>;

/// Inverse code table carried alongside the payload: one `(code, byte)`
/// pair per distinct byte value of the encoded stream.
pub type DecodeTable = Vec<(Code, u8)>;

/// Result of entropy-encoding a byte stream.
#[derive(Debug, Clone)]
pub struct HuffmanEncoded {
    /// Packed code bits; the final partial byte is zero-filled.
    pub payload: Vec<u8>,
    /// Exact number of meaningful bits in `payload`. The count is carried
    /// explicitly because filler bits are indistinguishable from code bits.
    pub bit_count: u64,
    /// Inverse code table for this stream.
    pub decode_table: DecodeTable,
}

enum Node {
    Leaf(u8),
    Internal(Box<Node>, Box<Node>),
}

/// Merge the two lowest-frequency nodes until a single root remains.
///
/// Returns `None` for an empty input stream.
fn build_tree(freqs: &[u64; 256]) -> Option<Node> {
    let mut slab: Vec<Option<Node>> = Vec::new();
    let mut heap: BinaryHeap<Reverse<(u64, u64, usize)>> = BinaryHeap::new();
    let mut seq = 0u64;

    for (byte, &freq) in freqs.iter().enumerate() {
        if freq > 0 {
            heap.push(Reverse((freq, seq, slab.len())));
            slab.push(Some(Node::Leaf(byte as u8)));
            seq += 1;
        }
    }

    loop {
        match (heap.pop(), heap.pop()) {
            (Some(Reverse((freq_a, _, a))), Some(Reverse((freq_b, _, b)))) => {
                let left = slab[a].take()?;
                let right = slab[b].take()?;
                heap.push(Reverse((freq_a + freq_b, seq, slab.len())));
                slab.push(Some(Node::Internal(Box::new(left), Box::new(right))));
                seq += 1;
            }
            (Some(Reverse((_, _, root))), None) => return slab[root].take(),
            _ => return None,
        }
    }
}

/// Depth-first walk assigning 0 to the left edge and 1 to the right edge.
///
/// A degenerate tree with a single leaf has no internal edge; its symbol
/// still gets an explicit one-bit code so the stream stays decodable.
fn derive_codes(node: &Node, prefix: &mut Code, codes: &mut [Option<Code>; 256]) {
    match node {
        Node::Leaf(byte) => {
            let code = if prefix.is_empty() {
                bitvec![u8, Msb0; 0]
            } else {
                prefix.clone()
            };
            codes[*byte as usize] = Some(code);
        }
        Node::Internal(left, right) => {
            prefix.push(false);
            derive_codes(left, prefix, codes);
            prefix.pop();
            prefix.push(true);
            derive_codes(right, prefix, codes);
            prefix.pop();
        }
    }
}

/// Entropy-encode `data` into a packed bitstream.
pub fn encode(data: &[u8]) -> HuffmanEncoded {
    let mut freqs = [0u64; 256];
    for &byte in data {
        freqs[byte as usize] += 1;
    }

    let Some(tree) = build_tree(&freqs) else {
        return HuffmanEncoded {
            payload: Vec::new(),
            bit_count: 0,
            decode_table: Vec::new(),
        };
    };

    const NONE: Option<Code> = None;
    let mut codes = [NONE; 256];
    derive_codes(&tree, &mut Code::new(), &mut codes);

    let mut bits: Code = BitVec::with_capacity(data.len() * 8);
    for &byte in data {
        if let Some(code) = &codes[byte as usize] {
            bits.extend_from_bitslice(code);
        }
    }

    let bit_count = bits.len() as u64;
    let decode_table = codes
        .iter()
        .enumerate()
        .filter_map(|(byte, code)| code.as_ref().map(|c| (c.clone(), byte as u8)))
        .collect();

    // Zero the filler bits of the final partial byte.
    bits.set_uninitialized(false);
    HuffmanEncoded {
        payload: bits.into_vec(),
        bit_count,
        decode_table,
    }
}

/// Decode exactly `bit_count` bits of `payload` against `decode_table`.
///
/// Walks MSB-first, emitting a byte whenever the accumulated bits match a
/// table entry. Fails with [`CodecError::MalformedContainer`] if the bit
/// count exceeds the payload, the accumulator outgrows the longest code
/// without a match, or bits remain unresolved at the end.
pub fn decode(
    payload: &[u8],
    decode_table: &DecodeTable,
    bit_count: u64,
) -> Result<Vec<u8>, CodecError> {
    let bits = payload.view_bits::<Msb0>();
    let bit_count = bit_count as usize;
    if bit_count > bits.len() {
        return Err(CodecError::MalformedContainer(format!(
            "bit count {} exceeds payload of {} bits",
            bit_count,
            bits.len()
        )));
    }

    let table: HashMap<&Code, u8> = decode_table.iter().map(|(code, byte)| (code, *byte)).collect();
    let max_code_len = decode_table.iter().map(|(code, _)| code.len()).max().unwrap_or(0);

    let mut output = Vec::new();
    let mut current = Code::new();
    for bit in &bits[..bit_count] {
        current.push(*bit);
        if let Some(&byte) = table.get(&current) {
            output.push(byte);
            current.clear();
        } else if current.len() >= max_code_len {
            return Err(CodecError::MalformedContainer(format!(
                "no code within {} bits at output position {}",
                max_code_len,
                output.len()
            )));
        }
    }

    if !current.is_empty() {
        return Err(CodecError::MalformedContainer(
            "stream ends inside a code".to_string(),
        ));
    }
    Ok(output)
}
