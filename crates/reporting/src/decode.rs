//! CSV input decoding into raw rows.

use campaign_core::types::RawRow;
use campaign_core::{CampaignError, CampaignResult};
use std::io::Read;
use tracing::debug;

/// Decode a CSV table whose first line is the header. Blank lines are
/// skipped by the reader; a line of empty cells (`,,`) is still a row.
/// Short rows leave their trailing columns absent and extra cells past
/// the header are dropped.
pub fn read_rows<R: Read>(reader: R) -> CampaignResult<Vec<RawRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let headers = reader
        .headers()
        .map_err(|e| CampaignError::Decode(e.to_string()))?
        .clone();

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| CampaignError::Decode(e.to_string()))?;
        let row: RawRow = headers
            .iter()
            .zip(record.iter())
            .map(|(column, value)| (column.to_string(), value.to_string()))
            .collect();
        rows.push(row);
    }

    debug!(rows = rows.len(), columns = headers.len(), "Decoded CSV input");
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregator::aggregate;
    use campaign_core::types::*;

    #[test]
    fn test_read_rows() {
        let input = "CAMPAIGN_ID, TOTAL_CLICKS ,KEYWORD\nc1,5,shoes\n\nc2,7,\"socks, wool\"\n";
        let rows = read_rows(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][CAMPAIGN_ID], "c1");
        assert_eq!(rows[0][TOTAL_CLICKS], "5");
        assert_eq!(rows[1][KEYWORD], "socks, wool");
    }

    #[test]
    fn test_short_rows_leave_columns_absent() {
        let input = "CAMPAIGN_ID,CAMPAIGN_NAME,KEYWORD\nc1\nc2,Spring,\n";
        let rows = read_rows(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert!(!rows[0].contains_key(CAMPAIGN_NAME));
        assert_eq!(rows[1][CAMPAIGN_NAME], "Spring");
        assert_eq!(rows[1][KEYWORD], "");
    }

    #[test]
    fn test_rows_of_empty_cells_are_kept() {
        let input = "CAMPAIGN_ID,CAMPAIGN_NAME,TOTAL_IMPRESSIONS\nc1,A,5\n,,\n";
        let rows = read_rows(input.as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);

        let out = aggregate(&rows);
        assert_eq!(out.len(), 2);
        assert!(out[1].key.values().iter().all(|v| *v == UNKNOWN));
        assert_eq!(out[1].metrics, Metrics::default());
    }

    #[test]
    fn test_quoted_empty_cell_is_a_row() {
        let rows = read_rows("CAMPAIGN_NAME\nA\n\"\"\n".as_bytes()).unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1][CAMPAIGN_NAME], "");
    }

    #[test]
    fn test_header_only() {
        let rows = read_rows("CAMPAIGN_ID,KEYWORD\n".as_bytes()).unwrap();
        assert!(rows.is_empty());
    }

    #[test]
    fn test_invalid_utf8_is_decode_error() {
        let input: &[u8] = b"CAMPAIGN_ID\n\xff\xfe\n";
        let err = read_rows(input).unwrap_err();
        assert!(matches!(err, CampaignError::Decode(_)));
        assert!(err.to_string().starts_with("Failed to parse CSV:"));
    }
}
