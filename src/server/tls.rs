use rustls::{Certificate, PrivateKey, ServerConfig};
use std::{
    fmt,
    fs::File,
    io::{self, BufReader},
    path::Path,
    sync::Arc,
};

// Tells if and how TLS security is available to a session. Whether the
// control or data channel is actually encrypted at a given moment is tracked
// in the session itself.
#[derive(Clone)]
pub enum FtpsConfig {
    Off,
    On { tls_config: Arc<ServerConfig> },
}

impl FtpsConfig {
    pub fn is_on(&self) -> bool {
        matches!(self, FtpsConfig::On { .. })
    }
}

impl fmt::Debug for FtpsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FtpsConfig::Off => write!(f, "Off"),
            FtpsConfig::On { .. } => write!(f, "On"),
        }
    }
}

pub fn new_config<P: AsRef<Path>>(certs_file: P, key_file: P) -> io::Result<Arc<ServerConfig>> {
    let certs: Vec<Certificate> = load_certs(certs_file)?;
    let privkey: PrivateKey = load_private_key(key_file)?;

    let config = ServerConfig::builder()
        .with_safe_defaults()
        .with_no_client_auth()
        .with_single_cert(certs, privkey)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

    Ok(Arc::new(config))
}

fn load_certs<P: AsRef<Path>>(filename: P) -> io::Result<Vec<Certificate>> {
    let certfile = File::open(filename)?;
    let mut reader = BufReader::new(certfile);
    let certs = rustls_pemfile::certs(&mut reader)?;
    Ok(certs.into_iter().map(Certificate).collect())
}

fn load_private_key<P: AsRef<Path>>(filename: P) -> io::Result<PrivateKey> {
    let pkcs8_keys = {
        let keyfile = File::open(&filename)?;
        let mut reader = BufReader::new(keyfile);
        rustls_pemfile::pkcs8_private_keys(&mut reader)?
    };

    // prefer pkcs8 keys
    if let Some(key) = pkcs8_keys.into_iter().next() {
        return Ok(PrivateKey(key));
    }

    let keyfile = File::open(&filename)?;
    let mut reader = BufReader::new(keyfile);
    let rsa_keys = rustls_pemfile::rsa_private_keys(&mut reader)?;
    rsa_keys
        .into_iter()
        .next()
        .map(PrivateKey)
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "no private key found"))
}
