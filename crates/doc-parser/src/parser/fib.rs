use crate::reader::ByteReader;
use doc_core::constants::*;
use doc_core::models::fib::{Fib, FibBase, FibRgLw97};
use doc_core::{DocError, Result};

/// Decode the File Information Block at the head of the WordDocument stream.
///
/// The FIB is a chain of counted regions. Each region is consumed by the
/// count it declares, so readers stay aligned even when a writer appended
/// words this version does not know about.
pub fn parse_fib(r: &mut ByteReader) -> Result<Fib> {
    // FibBase, fixed 32 bytes
    let w_ident = r.read_u16()?;
    if w_ident != FIB_WIDENT {
        return Err(DocError::BadFib {
            reason: format!("wIdent is 0x{w_ident:04X}, expected 0x{FIB_WIDENT:04X}"),
        });
    }
    let n_fib = r.read_u16()?;
    r.skip(2)?; // unused
    let lid = r.read_u16()?;
    let pn_next = r.read_u16()?;
    let flags = r.read_u16()?;
    let n_fib_back = r.read_u16()?;
    let l_key = r.read_u32()?;
    let envr = r.read_u8()?;
    let flags2 = r.read_u8()?;
    r.skip(12)?; // reserved3..reserved6

    let base = FibBase {
        w_ident,
        n_fib,
        lid,
        pn_next,
        flags,
        n_fib_back,
        l_key,
        envr,
        flags2,
    };

    if base.is_encrypted() {
        return Err(DocError::Encrypted);
    }

    // FibRgW97, preceded by its 16-bit-value count
    let csw = r.read_u16()?;
    if csw != FIB_CSW {
        return Err(DocError::BadFib {
            reason: format!("csw is {csw}, expected {FIB_CSW}"),
        });
    }
    r.skip(usize::from(csw) * 2)?;

    // FibRgLw97, preceded by its 32-bit-value count
    let cslw = r.read_u16()?;
    if cslw != FIB_CSLW {
        return Err(DocError::BadFib {
            reason: format!("cslw is {cslw}, expected {FIB_CSLW}"),
        });
    }
    let mut lw_values = [0u32; FIB_CSLW as usize];
    for value in lw_values.iter_mut() {
        *value = r.read_u32()?;
    }
    let lw = FibRgLw97 {
        cb_mac: lw_values[0],
        ccp_text: lw_values[3],
        ccp_ftn: lw_values[4],
        ccp_hdd: lw_values[5],
        ccp_mcr: lw_values[6],
        ccp_atn: lw_values[7],
        ccp_edn: lw_values[8],
        ccp_txbx: lw_values[9],
        ccp_hdr_txbx: lw_values[10],
    };

    // FibRgFcLcb blob. The count is accepted even when it does not match the
    // canonical table for a known version; fcClx/lcbClx sit at a fixed offset
    // common to every version.
    let cb_rg_fc_lcb = r.read_u16()?;
    let blob_len = usize::from(cb_rg_fc_lcb) * 8;
    if blob_len < FC_CLX_OFFSET + 8 {
        return Err(DocError::BadFib {
            reason: format!("cbRgFcLcb {cb_rg_fc_lcb} leaves no room for fcClx"),
        });
    }
    let blob = r.read_bytes(blob_len)?;
    let mut blob_reader = ByteReader::with_order(&blob, r.order());
    blob_reader.seek(FC_CLX_OFFSET)?;
    let fc_clx = blob_reader.read_u32()?;
    let lcb_clx = blob_reader.read_u32()?;
    let version = WordVersion::from_cb_rg_fc_lcb(cb_rg_fc_lcb);

    // FibRgCswNew, not needed for text retrieval
    let csw_new = r.read_u16()?;
    r.skip(usize::from(csw_new) * 2)?;

    log::debug!(
        "FIB decoded: nFib 0x{:04X} ({}), ccpText {}, fcClx {}, lcbClx {}",
        n_fib,
        version,
        lw.ccp_text,
        fc_clx,
        lcb_clx
    );

    Ok(Fib {
        base,
        lw,
        version,
        fc_clx,
        lcb_clx,
    })
}
