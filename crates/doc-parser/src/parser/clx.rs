use crate::reader::ByteReader;
use doc_core::constants::*;
use doc_core::models::piece::{FcCompressed, Pcd, PieceTable};
use doc_core::models::ByteOrder;
use doc_core::{DocError, Result};

fn bad(reason: impl Into<String>) -> DocError {
    DocError::BadClx {
        reason: reason.into(),
    }
}

/// Decode the Clx at `fc_clx` in the Table stream and return its piece table.
///
/// The Clx is zero or more Prc records (property modifiers, skipped without
/// interpretation) followed by exactly one Pcdt holding the PlcPcd: an
/// ascending CP array terminated by `last_cp`, then one 8-byte Pcd per piece.
pub fn parse_clx(
    table: &[u8],
    fc_clx: u32,
    lcb_clx: u32,
    last_cp: u32,
    order: ByteOrder,
) -> Result<PieceTable> {
    let start = fc_clx as usize;
    let len = lcb_clx as usize;
    let end = start.checked_add(len).filter(|&e| e <= table.len());
    let Some(end) = end else {
        return Err(bad(format!(
            "Clx region [{start}, {}) is outside the {} byte Table stream",
            start + len,
            table.len()
        )));
    };
    if len == 0 {
        return Err(bad("Clx is empty"));
    }

    let mut r = ByteReader::with_order(&table[start..end], order);

    // Skip the Prc prefix
    let mut prc_count = 0usize;
    while r.peek_u8()? == CLX_TAG_PRC {
        r.skip(1)?;
        let cb_grpprl = r.read_i16()?;
        if !(0..=CBGRPPRL_MAX).contains(&cb_grpprl) {
            return Err(bad(format!("cbGrpprl {cb_grpprl} out of range")));
        }
        r.skip(cb_grpprl as usize)?;
        prc_count += 1;
    }

    let tag = r.read_u8()?;
    if tag != CLX_TAG_PCDT {
        return Err(bad(format!("expected Pcdt tag 0x02, found 0x{tag:02X}")));
    }

    let lcb = r.read_u32()? as usize;
    if lcb > r.remaining() {
        return Err(bad(format!(
            "Pcdt declares {lcb} bytes, only {} remain",
            r.remaining()
        )));
    }
    let max_cps = lcb / 4 + 1;

    // CP array: ascending, one more element than the Pcd array, terminated
    // by the final CP of the document
    let mut cps = Vec::new();
    loop {
        if cps.len() >= max_cps {
            return Err(bad(format!(
                "no CP equal to the document end {last_cp} within the piece table"
            )));
        }
        let cp = r.read_u32()?;
        if cps.is_empty() {
            if cp != 0 {
                return Err(bad(format!("piece table starts at CP {cp}, expected 0")));
            }
        } else if cp <= *cps.last().unwrap() {
            return Err(bad(format!("CP array not strictly ascending at {cp}")));
        }
        cps.push(cp);
        if cp == last_cp {
            break;
        }
    }

    let piece_count = cps.len() - 1;
    if lcb != cps.len() * 4 + piece_count * 8 {
        return Err(bad(format!(
            "Pcdt length {lcb} does not fit {} CPs and {piece_count} Pcds",
            cps.len()
        )));
    }

    let mut pieces = Vec::with_capacity(piece_count);
    for _ in 0..piece_count {
        let flags = r.read_u16()?;
        let fc = FcCompressed(r.read_u32()?);
        let prm = r.read_u16()?;
        pieces.push(Pcd { flags, fc, prm });
    }

    log::debug!(
        "Clx decoded: {prc_count} Prc records skipped, {piece_count} pieces, end CP {last_cp}"
    );

    Ok(PieceTable { cps, pieces })
}
