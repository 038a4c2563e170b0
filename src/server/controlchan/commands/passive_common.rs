//! Contains shared code for the PASV and EPSV commands.

use rand::Rng;
use std::{io, net::IpAddr, net::SocketAddr, ops::RangeInclusive};
use tokio::net::{TcpListener, TcpSocket};

const BIND_RETRIES: u8 = 10;

// Binds a fresh one-shot listener for a passive data connection, on a random
// free port within the configured range. The OS arbitrates between sessions
// racing for the same port.
pub(super) fn bind_passive_listener(local_ip: IpAddr, passive_ports: &RangeInclusive<u16>) -> io::Result<TcpListener> {
    let span = u32::from(*passive_ports.end()) - u32::from(*passive_ports.start()) + 1;

    for _ in 0..BIND_RETRIES {
        let port = *passive_ports.start() + rand::thread_rng().gen_range(0..span) as u16;
        let socket = match local_ip {
            IpAddr::V4(_) => TcpSocket::new_v4()?,
            IpAddr::V6(_) => TcpSocket::new_v6()?,
        };
        socket.set_reuseaddr(true)?;
        if socket.bind(SocketAddr::new(local_ip, port)).is_ok() {
            return socket.listen(1);
        }
    }

    Err(io::Error::new(io::ErrorKind::AddrInUse, "no free port in the passive range"))
}
