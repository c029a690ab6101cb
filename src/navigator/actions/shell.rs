use std::io::Write;

use anyhow::Result;

use super::{report_exit, require_input, running_banner, shell_request, Con, Flow};
use crate::navigator::Services;
use crate::ui::LineReader;

pub(super) fn run_any_command<R: LineReader, W: Write>(
    con: Con<'_, R, W>,
    svc: &Services,
) -> Result<Flow> {
    let Some(command) = require_input(con, "Command: ", "Command")? else {
        return Ok(Flow::Pause);
    };
    running_banner(con, &format!("{} -c {command}", svc.settings.shell))?;
    let res = svc.exec.run(shell_request(svc, &command, None));
    report_exit(con, &res, "Command")?;
    Ok(Flow::Pause)
}
