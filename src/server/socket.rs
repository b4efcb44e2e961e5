//! # Socket de Escucha
//! src/server/socket.rs
//!
//! Envuelve bind/listen/accept del sistema operativo:
//!
//! 1. `bind_and_listen` prueba, en orden, las direcciones wildcard de la
//!    familia pedida y se queda con la primera que logra hacer bind.
//! 2. `accept` bloquea hasta la siguiente conexión y describe ambos
//!    extremos (dirección, puerto y nombre DNS) sin importar la familia.
//!
//! Con la familia IPv6 el socket es dual-stack (`IPV6_V6ONLY = false`):
//! los clientes IPv4 llegan como direcciones `::ffff:a.b.c.d`.

use socket2::{Domain, Protocol, Socket, Type};
use std::io;
use std::net::{Ipv4Addr, Ipv6Addr, SocketAddr, TcpStream};
use thiserror::Error;

/// Backlog pedido a `listen`; el kernel lo recorta a su máximo
/// (`net.core.somaxconn` en Linux).
const MAX_BACKLOG: i32 = 4096;

/// Familia de direcciones del socket de escucha
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum AddressFamily {
    /// IPv6 y, si falla, IPv4
    Any,
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    /// Direcciones wildcard candidatas para el bind, en orden de preferencia
    fn wildcard_candidates(self, port: u16) -> Vec<SocketAddr> {
        let v6 = SocketAddr::from((Ipv6Addr::UNSPECIFIED, port));
        let v4 = SocketAddr::from((Ipv4Addr::UNSPECIFIED, port));
        match self {
            AddressFamily::Any => vec![v6, v4],
            AddressFamily::Ipv4 => vec![v4],
            AddressFamily::Ipv6 => vec![v6],
        }
    }

    fn of(addr: &SocketAddr) -> Self {
        match addr {
            SocketAddr::V4(_) => AddressFamily::Ipv4,
            SocketAddr::V6(_) => AddressFamily::Ipv6,
        }
    }
}

#[derive(Debug, Error)]
pub enum SocketError {
    #[error("could not bind port {port}: {source}")]
    Bind { port: u16, source: io::Error },

    #[error("listen() failed: {0}")]
    Listen(#[source] io::Error),

    #[error("socket is not listening")]
    NotListening,

    #[error("accept() failed: {0}")]
    Accept(#[source] io::Error),

    #[error("accepted connection is neither IPv4 nor IPv6")]
    UnsupportedFamily,

    #[error("could not inspect accepted connection: {0}")]
    Endpoint(#[source] io::Error),
}

impl SocketError {
    /// Un error fatal termina el loop de accept; el resto solo descarta
    /// la conexión recién aceptada.
    pub fn is_fatal(&self) -> bool {
        !matches!(self, SocketError::UnsupportedFamily | SocketError::Endpoint(_))
    }
}

/// Un extremo de una conexión, en texto
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub family: AddressFamily,
    pub address: String,
    pub port: u16,
    /// Nombre DNS; si la resolución falla, la dirección numérica
    pub dns_name: String,
}

impl Endpoint {
    /// Formatea una dirección de cualquier familia
    pub fn describe(addr: SocketAddr, resolve_name: bool) -> Self {
        let address = addr.ip().to_string();
        let dns_name = if resolve_name {
            dns_lookup::lookup_addr(&addr.ip()).unwrap_or_else(|_| address.clone())
        } else {
            address.clone()
        };

        Self {
            family: AddressFamily::of(&addr),
            address,
            port: addr.port(),
            dns_name,
        }
    }
}

/// Conexión aceptada, propiedad exclusiva del worker que la atiende
#[derive(Debug)]
pub struct AcceptedConnection {
    pub stream: TcpStream,
    pub peer: Endpoint,
    pub local: Endpoint,
}

/// Socket de escucha de un puerto
///
/// Tiene a lo sumo un socket del sistema abierto; `close` es idempotente.
#[derive(Debug)]
pub struct ListenSocket {
    port: u16,
    socket: Option<Socket>,
    family: Option<AddressFamily>,
    resolve_names: bool,
}

impl ListenSocket {
    pub fn new(port: u16) -> Self {
        Self {
            port,
            socket: None,
            family: None,
            resolve_names: true,
        }
    }

    /// Activa o desactiva la resolución DNS en `accept`
    pub fn with_name_resolution(mut self, resolve_names: bool) -> Self {
        self.resolve_names = resolve_names;
        self
    }

    /// Crea el socket, hace bind y listen
    ///
    /// Retorna la dirección local efectiva (útil con el puerto 0).
    pub fn bind_and_listen(&mut self, family: AddressFamily) -> Result<SocketAddr, SocketError> {
        self.close();

        let mut last_error = None;
        for candidate in family.wildcard_candidates(self.port) {
            match Self::bind_candidate(candidate) {
                Ok(socket) => {
                    socket.listen(MAX_BACKLOG).map_err(SocketError::Listen)?;
                    self.family = Some(AddressFamily::of(&candidate));
                    self.socket = Some(socket);
                    return self.local_addr();
                }
                Err(e) => {
                    tracing::debug!(address = %candidate, error = %e, "Bind fallido, probando siguiente");
                    last_error = Some(e);
                }
            }
        }

        Err(SocketError::Bind {
            port: self.port,
            source: last_error
                .unwrap_or_else(|| io::Error::new(io::ErrorKind::AddrNotAvailable, "no address candidates")),
        })
    }

    fn bind_candidate(addr: SocketAddr) -> io::Result<Socket> {
        let socket = Socket::new(Domain::for_address(addr), Type::STREAM, Some(Protocol::TCP))?;
        if addr.is_ipv6() {
            socket.set_only_v6(false)?;
        }
        socket.set_reuse_address(true)?;
        socket.bind(&addr.into())?;
        Ok(socket)
    }

    /// Dirección local del socket de escucha
    pub fn local_addr(&self) -> Result<SocketAddr, SocketError> {
        let socket = self.socket.as_ref().ok_or(SocketError::NotListening)?;
        socket
            .local_addr()
            .map_err(SocketError::Endpoint)?
            .as_socket()
            .ok_or(SocketError::UnsupportedFamily)
    }

    /// Familia con la que se hizo el bind
    pub fn family(&self) -> Option<AddressFamily> {
        self.family
    }

    /// Bloquea hasta aceptar una conexión
    ///
    /// Las interrupciones por señales se reintentan de forma transparente.
    pub fn accept(&self) -> Result<AcceptedConnection, SocketError> {
        let listener = self.socket.as_ref().ok_or(SocketError::NotListening)?;

        let (socket, peer_addr) = loop {
            match listener.accept() {
                Ok(pair) => break pair,
                Err(e) if matches!(e.kind(), io::ErrorKind::Interrupted | io::ErrorKind::WouldBlock) => {
                    continue
                }
                Err(e) => return Err(SocketError::Accept(e)),
            }
        };

        // El socket aceptado se cierra al salir si la familia no es IP
        let peer_addr = peer_addr.as_socket().ok_or(SocketError::UnsupportedFamily)?;
        let stream = TcpStream::from(socket);
        let local_addr = stream.local_addr().map_err(SocketError::Endpoint)?;

        Ok(AcceptedConnection {
            stream,
            peer: Endpoint::describe(peer_addr, self.resolve_names),
            local: Endpoint::describe(local_addr, self.resolve_names),
        })
    }

    /// Cierra el socket de escucha (idempotente)
    pub fn close(&mut self) {
        if self.socket.take().is_some() {
            tracing::debug!(port = self.port, "Socket de escucha cerrado");
        }
        self.family = None;
    }
}

impl Drop for ListenSocket {
    fn drop(&mut self) {
        self.close();
    }
}
