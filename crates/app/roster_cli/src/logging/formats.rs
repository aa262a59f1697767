use std::io::Write;

use flexi_logger::{DeferredNow, style};
use log::{Level, Record};

/// `LEVEL message`, colored by level; debug and trace lines also name the
/// emitting module.
pub fn cli_format(
    w: &mut dyn Write,
    _now: &mut DeferredNow,
    record: &Record,
) -> Result<(), std::io::Error> {
    let level = record.level();
    let label = style(level).paint(level.as_str());
    if level >= Level::Debug {
        write!(
            w,
            "{label} [{}] {}",
            record.module_path().unwrap_or("<unnamed>"),
            record.args()
        )
    } else {
        write!(w, "{label} {}", record.args())
    }
}
