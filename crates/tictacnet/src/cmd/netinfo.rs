use tictacnet_transport::{allocate_listen_port, detect_local_address};

use crate::cmd::NetinfoArgs;
use crate::exit::{transport_error, CliResult, SUCCESS};
use crate::output::{print_event, Event, OutputFormat};

pub fn run(_args: NetinfoArgs, format: OutputFormat) -> CliResult<i32> {
    let address = detect_local_address();
    let port =
        allocate_listen_port().map_err(|err| transport_error("port allocation failed", err))?;

    print_event(&Event::NetInfo { address, port }, format);
    Ok(SUCCESS)
}
