use super::{
    command::{AuthParam, Command, Password, ProtParam},
    parse_error::{ParseError, Result},
};
use std::net::{Ipv4Addr, SocketAddrV4};
use std::str;

/// Parse one CRLF-terminated control line into a [`Command`].
///
/// The line is split on the first space into a case-insensitive verb and a
/// verbatim argument with the trailing CR/LF stripped.
pub fn parse<T: AsRef<[u8]>>(line: T) -> Result<Command> {
    let line = str::from_utf8(line.as_ref()).map_err(|_| ParseError::InvalidUtf8)?;
    let line = line.trim_end_matches(|c| c == '\r' || c == '\n');
    let (verb, arg) = match line.split_once(' ') {
        Some((verb, arg)) => (verb, arg),
        None => (line, ""),
    };
    let verb = verb.to_uppercase();

    let cmd = match verb.as_str() {
        "USER" => Command::User {
            username: required(arg)?.to_string(),
        },
        "PASS" => Command::Pass {
            password: Password::new(arg),
        },
        "QUIT" => no_arg(arg, Command::Quit)?,
        "REIN" => no_arg(arg, Command::Rein)?,
        "NOOP" => no_arg(arg, Command::Noop)?,
        "SYST" => no_arg(arg, Command::Syst)?,
        "FEAT" => no_arg(arg, Command::Feat)?,
        "OPTS" => Command::Opts {
            option: required(arg)?.to_string(),
        },
        "TYPE" => Command::Type {
            param: required(arg)?.trim().to_uppercase(),
        },
        "STRU" => Command::Stru {
            param: required(arg)?.trim().to_uppercase(),
        },
        "MODE" => Command::Mode {
            param: required(arg)?.trim().to_uppercase(),
        },
        "PWD" | "XPWD" => no_arg(arg, Command::Pwd)?,
        "CWD" | "XCWD" => Command::Cwd {
            path: required(arg)?.to_string(),
        },
        "CDUP" => no_arg(arg, Command::Cdup)?,
        "MKD" | "XMKD" => Command::Mkd {
            path: required(arg)?.to_string(),
        },
        "RMD" | "XRMD" => Command::Rmd {
            path: required(arg)?.to_string(),
        },
        "DELE" => Command::Dele {
            path: required(arg)?.to_string(),
        },
        "SIZE" => Command::Size {
            path: required(arg)?.to_string(),
        },
        "MDTM" => Command::Mdtm {
            path: required(arg)?.to_string(),
        },
        "RNFR" => Command::Rnfr {
            path: required(arg)?.to_string(),
        },
        "RNTO" => Command::Rnto {
            path: required(arg)?.to_string(),
        },
        "STAT" => Command::Stat {
            path: optional(arg).map(str::to_string),
        },
        "PORT" => Command::Port {
            addr: parse_port_tuple(required(arg)?)?,
        },
        "EPRT" => parse_eprt(required(arg)?)?,
        "PASV" => no_arg(arg, Command::Pasv)?,
        "EPSV" => Command::Epsv {
            param: optional(arg).map(|p| p.to_uppercase()),
        },
        "RETR" => Command::Retr {
            path: required(arg)?.to_string(),
        },
        "STOR" => Command::Stor {
            path: required(arg)?.to_string(),
        },
        "APPE" => Command::Appe {
            path: required(arg)?.to_string(),
        },
        // The name is chosen by the server, so any suggested path is ignored.
        "STOU" => Command::Stou,
        "REST" => Command::Rest {
            offset: required(arg)?.trim().parse::<u64>().map_err(|_| ParseError::InvalidCommand)?,
        },
        "ABOR" => no_arg(arg, Command::Abor)?,
        "ALLO" => Command::Allo,
        "LIST" => Command::List { path: listing_path(arg) },
        "NLST" => Command::Nlst { path: listing_path(arg) },
        "AUTH" => match required(arg)?.trim().to_uppercase().as_str() {
            "TLS" => Command::Auth { protocol: AuthParam::Tls },
            "SSL" => Command::Auth { protocol: AuthParam::Ssl },
            _ => return Err(ParseError::InvalidCommand),
        },
        "PBSZ" => {
            // Only the value 0 is meaningful for stream-mode TLS; the reply
            // echoes PBSZ=0 regardless, so the argument just has to be a number.
            required(arg)?.trim().parse::<u64>().map_err(|_| ParseError::InvalidCommand)?;
            Command::Pbsz
        }
        "PROT" => match required(arg)?.trim().to_uppercase().as_str() {
            "C" => Command::Prot { param: ProtParam::Clear },
            "S" => Command::Prot { param: ProtParam::Safe },
            "E" => Command::Prot {
                param: ProtParam::Confidential,
            },
            "P" => Command::Prot { param: ProtParam::Private },
            _ => return Err(ParseError::InvalidCommand),
        },
        "CCC" => no_arg(arg, Command::Ccc)?,
        _ => return Err(ParseError::UnknownCommand { command: verb }),
    };

    Ok(cmd)
}

fn required(arg: &str) -> Result<&str> {
    if arg.is_empty() {
        Err(ParseError::InvalidCommand)
    } else {
        Ok(arg)
    }
}

fn optional(arg: &str) -> Option<&str> {
    if arg.is_empty() {
        None
    } else {
        Some(arg)
    }
}

fn no_arg(arg: &str, cmd: Command) -> Result<Command> {
    if arg.is_empty() {
        Ok(cmd)
    } else {
        Err(ParseError::InvalidCommand)
    }
}

// LIST and NLST may carry `ls` style options before the path; we only want
// the path.
fn listing_path(arg: &str) -> Option<String> {
    arg.split(' ').find(|s| !s.is_empty() && !s.starts_with('-')).map(str::to_string)
}

// PORT h1,h2,h3,h4,p1,p2
fn parse_port_tuple(arg: &str) -> Result<SocketAddrV4> {
    let mut octets = [0u8; 6];
    let mut parts = arg.split(',');
    for slot in octets.iter_mut() {
        *slot = parts
            .next()
            .and_then(|p| p.trim().parse::<u8>().ok())
            .ok_or(ParseError::InvalidCommand)?;
    }
    if parts.next().is_some() {
        return Err(ParseError::InvalidCommand);
    }
    let ip = Ipv4Addr::new(octets[0], octets[1], octets[2], octets[3]);
    let port = (u16::from(octets[4]) << 8) | u16::from(octets[5]);
    Ok(SocketAddrV4::new(ip, port))
}

// EPRT |af|addr|port| with an arbitrary delimiter character. The address
// family is validated by the handler so it can answer 522.
fn parse_eprt(arg: &str) -> Result<Command> {
    let delim = arg.chars().next().ok_or(ParseError::InvalidCommand)?;
    let fields: Vec<&str> = arg
        .strip_prefix(delim)
        .and_then(|rest| rest.strip_suffix(delim))
        .map(|inner| inner.split(delim).collect())
        .ok_or(ParseError::InvalidCommand)?;
    match fields.as_slice() {
        [proto, host, port] => Ok(Command::Eprt {
            proto: proto.to_string(),
            host: host.to_string(),
            port: port.trim().parse::<u16>().map_err(|_| ParseError::InvalidCommand)?,
        }),
        _ => Err(ParseError::InvalidCommand),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn verb_is_case_insensitive_and_arg_verbatim() {
        assert_eq!(
            parse("user Dossier\r\n").unwrap(),
            Command::User {
                username: "Dossier".to_string()
            }
        );
        assert_eq!(
            parse("STOR with spaces.txt\r\n").unwrap(),
            Command::Stor {
                path: "with spaces.txt".to_string()
            }
        );
    }

    #[test]
    fn empty_line_is_unknown() {
        assert_eq!(parse("\r\n"), Err(ParseError::UnknownCommand { command: "".to_string() }));
    }

    #[test]
    fn missing_argument_is_invalid() {
        assert_eq!(parse("USER\r\n"), Err(ParseError::InvalidCommand));
        assert_eq!(parse("RETR \r\n"), Err(ParseError::InvalidCommand));
    }

    #[test]
    fn port_tuple_decodes_address_and_port() {
        assert_eq!(
            parse("PORT 127,0,0,1,4,1\r\n").unwrap(),
            Command::Port {
                addr: "127.0.0.1:1025".parse().unwrap()
            }
        );
        assert_eq!(parse("PORT 127,0,0,1,4\r\n"), Err(ParseError::InvalidCommand));
        assert_eq!(parse("PORT 356,0,0,1,4,1\r\n"), Err(ParseError::InvalidCommand));
    }

    #[test]
    fn eprt_fields_are_split_on_the_delimiter() {
        assert_eq!(
            parse("EPRT |1|132.235.1.2|6275|\r\n").unwrap(),
            Command::Eprt {
                proto: "1".to_string(),
                host: "132.235.1.2".to_string(),
                port: 6275
            }
        );
        assert_eq!(
            parse("EPRT |2|1080::8:800:200C:417A|5282|\r\n").unwrap(),
            Command::Eprt {
                proto: "2".to_string(),
                host: "1080::8:800:200C:417A".to_string(),
                port: 5282
            }
        );
        assert_eq!(parse("EPRT |1|127.0.0.1|\r\n"), Err(ParseError::InvalidCommand));
    }

    #[test]
    fn listing_options_are_dropped() {
        assert_eq!(parse("LIST -la /tmp\r\n").unwrap(), Command::List { path: Some("/tmp".to_string()) });
        assert_eq!(parse("LIST\r\n").unwrap(), Command::List { path: None });
        assert_eq!(parse("NLST\r\n").unwrap(), Command::Nlst { path: None });
    }

    #[test]
    fn rest_takes_a_decimal_offset() {
        assert_eq!(parse("REST 1024\r\n").unwrap(), Command::Rest { offset: 1024 });
        assert_eq!(parse("REST x\r\n"), Err(ParseError::InvalidCommand));
    }

    #[test]
    fn auth_accepts_tls_and_ssl() {
        assert_eq!(parse("AUTH TLS\r\n").unwrap(), Command::Auth { protocol: AuthParam::Tls });
        assert_eq!(parse("AUTH ssl\r\n").unwrap(), Command::Auth { protocol: AuthParam::Ssl });
        assert_eq!(parse("AUTH KRB5\r\n"), Err(ParseError::InvalidCommand));
    }

    #[test]
    fn unsupported_type_params_survive_parsing() {
        // The handler answers 504 for these, so the parser must let them through.
        assert_eq!(parse("TYPE X\r\n").unwrap(), Command::Type { param: "X".to_string() });
        assert_eq!(parse("STRU R\r\n").unwrap(), Command::Stru { param: "R".to_string() });
        assert_eq!(parse("MODE B\r\n").unwrap(), Command::Mode { param: "B".to_string() });
    }
}
