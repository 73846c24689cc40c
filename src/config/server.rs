use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Directory holding the SQLite databases and the cached Telegram chat id.
    pub data_dir: PathBuf,
    pub front_dir: PathBuf,
    pub img_dir: PathBuf,
    pub gost_dir: PathBuf,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8080,
            data_dir: PathBuf::from("./data"),
            front_dir: PathBuf::from("front"),
            img_dir: PathBuf::from("img"),
            gost_dir: PathBuf::from("gost"),
        }
    }
}
