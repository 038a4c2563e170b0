use std::fmt;
use std::net::SocketAddrV4;

// Wrapper that keeps the password out of debug output and logs.
#[derive(PartialEq, Eq, Clone)]
pub struct Password(String);

impl Password {
    pub fn new<T: Into<String>>(password: T) -> Self {
        Password(password.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "********")
    }
}

// The parameter that can be given to the `AUTH` command.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum AuthParam {
    Ssl,
    Tls,
}

// The parameter that can be given to the `PROT` command.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ProtParam {
    // 'C' - Clear - neither Integrity nor Privacy
    Clear,
    // 'S' - Safe - Integrity without Privacy
    Safe,
    // 'E' - Confidential - Privacy without Integrity
    Confidential,
    // 'P' - Private - Integrity and Privacy
    Private,
}

/// A parsed client command with its arguments.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Command {
    User {
        username: String,
    },
    Pass {
        password: Password,
    },
    Quit,
    Rein,
    Noop,
    Syst,
    Feat,
    Opts {
        /// The option string, verbatim. Only `UTF8 ON`/`UTF8 OFF` are known.
        option: String,
    },
    Type {
        /// The requested representation; anything outside `A`/`I` is refused.
        param: String,
    },
    Stru {
        param: String,
    },
    Mode {
        param: String,
    },
    Pwd,
    Cwd {
        path: String,
    },
    Cdup,
    Mkd {
        path: String,
    },
    Rmd {
        path: String,
    },
    Dele {
        path: String,
    },
    Size {
        path: String,
    },
    Mdtm {
        path: String,
    },
    Rnfr {
        path: String,
    },
    Rnto {
        path: String,
    },
    Stat {
        path: Option<String>,
    },
    Port {
        /// The already-decoded h1,h2,h3,h4,p1,p2 endpoint.
        addr: SocketAddrV4,
    },
    Eprt {
        /// Address family field: `1` for IPv4, `2` for IPv6, verbatim otherwise.
        proto: String,
        host: String,
        port: u16,
    },
    Pasv,
    Epsv {
        param: Option<String>,
    },
    Retr {
        path: String,
    },
    Stor {
        path: String,
    },
    Appe {
        path: String,
    },
    Stou,
    Rest {
        offset: u64,
    },
    Abor,
    Allo,
    List {
        path: Option<String>,
    },
    Nlst {
        path: Option<String>,
    },
    Auth {
        protocol: AuthParam,
    },
    Pbsz,
    Prot {
        param: ProtParam,
    },
    Ccc,
}
