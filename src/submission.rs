//! Submission file output.

use csv::WriterBuilder;
use std::path::Path;

use crate::error::Result;

/// Writes `id,<target>` rows, one per prediction, with no index column.
pub fn write_submission<P: AsRef<Path>>(
    path: P,
    target_column: &str,
    ids: &[String],
    predictions: &[usize],
) -> Result<()> {
    debug_assert_eq!(ids.len(), predictions.len());
    let mut wtr = WriterBuilder::new().from_path(path.as_ref())?;
    wtr.write_record(["id", target_column])?;

    for (id, class) in ids.iter().zip(predictions) {
        let class = class.to_string();
        wtr.write_record([id.as_str(), class.as_str()])?;
    }

    wtr.flush()?;
    Ok(())
}
