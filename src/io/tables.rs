//! CSV codec for the reduced tables (`AggRecord`, `FitRecord`).
//!
//! Records are flat serde structs, so the header row is the field list.
//! Floats are written in their shortest round-trip form; NaN is written as
//! `NaN` and parses back as NaN.

use std::io::{Read, Write};

use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::error::AppError;

/// Write `rows` (with header) to `writer`.
pub fn encode_rows<T: Serialize, W: Write>(writer: W, rows: &[T]) -> Result<(), AppError> {
    let mut wtr = csv::Writer::from_writer(writer);
    for row in rows {
        wtr.serialize(row)
            .map_err(|e| AppError::new(3, format!("Failed to encode table row: {e}")))?;
    }
    wtr.flush()
        .map_err(|e| AppError::new(3, format!("Failed to flush table: {e}")))?;
    Ok(())
}

/// Read all rows from `reader`.
pub fn decode_rows<T: DeserializeOwned, R: Read>(reader: R) -> Result<Vec<T>, AppError> {
    let mut rdr = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut rows = Vec::new();
    for (idx, result) in rdr.deserialize().enumerate() {
        let row: T = result
            .map_err(|e| AppError::new(3, format!("line {}: failed to decode table row: {e}", idx + 2)))?;
        rows.push(row);
    }
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{AggRecord, FitRecord};

    fn agg(c: f64, rmean: f64, rstd: f64) -> AggRecord {
        AggRecord {
            nucleipref: "de".to_string(),
            model: "ba".to_string(),
            nvertices: 500,
            avgdegree: 6.0,
            seed: 3,
            c,
            rmean,
            rstd,
            smean: 0.1 + c / 3.0,
            sstd: 0.0,
        }
    }

    #[test]
    fn aggregated_rows_read_back_equal() {
        let rows = vec![agg(0.1, 1.0 / 3.0, 0.05), agg(0.5, 0.7, f64::NAN)];
        let mut buf = Vec::new();
        encode_rows(&mut buf, &rows).unwrap();

        let text = String::from_utf8(buf.clone()).unwrap();
        assert!(text.starts_with("nucleipref,model,nvertices,avgdegree,seed,c,rmean,rstd,smean,sstd\n"));

        let back: Vec<AggRecord> = decode_rows(buf.as_slice()).unwrap();
        assert_eq!(back.len(), 2);
        assert_eq!(back[0].rmean, rows[0].rmean);
        assert_eq!(back[0].smean, rows[0].smean);
        assert_eq!(back[1].c, 0.5);
        assert!(back[1].rstd.is_nan());
    }

    #[test]
    fn fit_rows_read_back_equal() {
        let rows = vec![FitRecord {
            nucleipref: "ac".to_string(),
            model: "er".to_string(),
            nvertices: 100,
            avgdegree: 4.5,
            seed: 0,
            cmax: 0.45,
            rmax: 0.812_345_678_9,
            a: -0.512_3,
            b: -6.789_012_345,
        }];
        let mut buf = Vec::new();
        encode_rows(&mut buf, &rows).unwrap();
        let back: Vec<FitRecord> = decode_rows(buf.as_slice()).unwrap();
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].avgdegree, 4.5);
        assert_eq!(back[0].rmax, rows[0].rmax);
        assert_eq!(back[0].b, rows[0].b);
    }

    #[test]
    fn undecodable_row_is_a_table_error() {
        let text = "nucleipref,model,nvertices,avgdegree,seed,cmax,rmax,a,b\nde,ba,x,4,0,0.5,0.8,-0.5,-6\n";
        let err = decode_rows::<FitRecord, _>(text.as_bytes()).unwrap_err();
        assert_eq!(err.exit_code(), 3);
        assert!(err.message().starts_with("line 2:"));
    }
}
