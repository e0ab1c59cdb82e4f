use flexi_logger::{DeferredNow, style};
use log::{Level, Record};

/// Single-line format: bare message for `info`, level-tagged otherwise.
pub fn cli_format(
    w: &mut dyn std::io::Write,
    _now: &mut DeferredNow,
    record: &Record,
) -> std::io::Result<()> {
    let level = record.level();
    if level == Level::Info {
        write!(w, "{}", record.args())
    } else {
        write!(
            w,
            "{}: {}",
            style(level).paint(level.to_string().to_lowercase()),
            record.args()
        )
    }
}
