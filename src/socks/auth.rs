//! SOCKS5 method negotiation
//!
//! Only "no authentication" is ever selected.

use super::consts::*;
use super::frame::read_frame;
use crate::error::{ProxyError, Socks5Error};
use tokio::io::{AsyncRead, AsyncWrite, AsyncWriteExt};

/// Authentication method types
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// No authentication required
    None,
}

impl AuthMethod {
    /// Convert to SOCKS5 method byte
    pub fn to_byte(self) -> u8 {
        match self {
            AuthMethod::None => SOCKS5_AUTH_METHOD_NONE,
        }
    }

    /// Parse from SOCKS5 method byte
    pub fn from_byte(byte: u8) -> Option<Self> {
        match byte {
            SOCKS5_AUTH_METHOD_NONE => Some(AuthMethod::None),
            _ => None,
        }
    }
}

/// Perform method negotiation
///
/// # SOCKS5 Greeting Format
///
/// ```text
/// +----+----------+----------+
/// |VER | NMETHODS | METHODS  |
/// +----+----------+----------+
/// | 1  |    1     | 1 to 255 |
/// +----+----------+----------+
/// ```
///
/// Writes `05 00` when "no authentication" is offered and `05 FF` otherwise;
/// in the latter case the caller must drop the connection. A malformed
/// greeting gets no reply at all.
pub async fn negotiate<S>(stream: &mut S) -> Result<AuthMethod, ProxyError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let greeting = read_frame(stream, greeting_len).await?;
    let methods = &greeting[2..];

    let selected = select_auth_method(methods);

    stream
        .write_all(&[
            SOCKS5_VERSION,
            selected
                .map(|m| m.to_byte())
                .unwrap_or(SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE),
        ])
        .await?;
    stream.flush().await?;

    selected.ok_or(ProxyError::MethodUnsupported)
}

/// Total greeting length once VER and NMETHODS are known
fn greeting_len(buf: &[u8]) -> Result<Option<usize>, Socks5Error> {
    if let Some(&version) = buf.first() {
        if version != SOCKS5_VERSION {
            return Err(Socks5Error::UnsupportedVersion(version));
        }
    }

    match buf.get(1) {
        Some(0) => Err(Socks5Error::NoMethods),
        Some(&n) => Ok(Some(2 + n as usize)),
        None => Ok(None),
    }
}

/// First offered method this proxy supports
fn select_auth_method(methods: &[u8]) -> Option<AuthMethod> {
    methods.iter().copied().find_map(AuthMethod::from_byte)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::io::Builder;

    #[test]
    fn test_auth_method_to_byte() {
        assert_eq!(AuthMethod::None.to_byte(), SOCKS5_AUTH_METHOD_NONE);
    }

    #[test]
    fn test_auth_method_from_byte() {
        assert_eq!(AuthMethod::from_byte(0), Some(AuthMethod::None));
        assert_eq!(AuthMethod::from_byte(1), None); // GSSAPI
        assert_eq!(AuthMethod::from_byte(2), None); // username/password
        assert_eq!(AuthMethod::from_byte(255), None);
    }

    #[test]
    fn test_select_auth_method_any_position() {
        assert_eq!(select_auth_method(&[0]), Some(AuthMethod::None));
        assert_eq!(select_auth_method(&[2, 0]), Some(AuthMethod::None));
        assert_eq!(select_auth_method(&[1, 2, 0x80, 0]), Some(AuthMethod::None));
        assert_eq!(select_auth_method(&[1, 2]), None);
        assert_eq!(select_auth_method(&[]), None);
    }

    #[test]
    fn test_greeting_len() {
        assert_eq!(greeting_len(&[]), Ok(None));
        assert_eq!(greeting_len(&[5]), Ok(None));
        assert_eq!(greeting_len(&[5, 3]), Ok(Some(5)));
        assert_eq!(greeting_len(&[4]), Err(Socks5Error::UnsupportedVersion(4)));
        assert_eq!(greeting_len(&[5, 0]), Err(Socks5Error::NoMethods));
    }

    #[tokio::test]
    async fn test_negotiate_no_auth() {
        let mut stream = Builder::new()
            .read(&[SOCKS5_VERSION, 1, SOCKS5_AUTH_METHOD_NONE])
            .write(&[SOCKS5_VERSION, SOCKS5_AUTH_METHOD_NONE])
            .build();

        let method = negotiate(&mut stream).await.unwrap();
        assert_eq!(method, AuthMethod::None);
    }

    #[tokio::test]
    async fn test_negotiate_selects_no_auth_from_every_list() {
        let lists: Vec<Vec<u8>> = vec![
            vec![0],
            vec![0, 2],
            vec![2, 0],
            vec![1, 2, 3, 0],
            (0..=254).collect(),
            (0..=254).rev().collect(),
        ];

        for methods in lists {
            let mut greeting = vec![SOCKS5_VERSION, methods.len() as u8];
            greeting.extend_from_slice(&methods);

            let mut stream = Builder::new()
                .read(&greeting)
                .write(&[SOCKS5_VERSION, SOCKS5_AUTH_METHOD_NONE])
                .build();

            assert_eq!(negotiate(&mut stream).await.unwrap(), AuthMethod::None);
        }
    }

    #[tokio::test]
    async fn test_negotiate_rejects_lists_without_no_auth() {
        let lists: Vec<Vec<u8>> = vec![vec![2], vec![1, 2], vec![0xFF], (1..=255).collect()];

        for methods in lists {
            let mut greeting = vec![SOCKS5_VERSION, methods.len() as u8];
            greeting.extend_from_slice(&methods);

            let mut stream = Builder::new()
                .read(&greeting)
                .write(&[SOCKS5_VERSION, SOCKS5_AUTH_METHOD_NOT_ACCEPTABLE])
                .build();

            let err = negotiate(&mut stream).await.unwrap_err();
            assert!(matches!(err, ProxyError::MethodUnsupported));
        }
    }

    #[tokio::test]
    async fn test_negotiate_split_greeting() {
        let mut stream = Builder::new()
            .read(&[SOCKS5_VERSION])
            .read(&[2, 2])
            .read(&[SOCKS5_AUTH_METHOD_NONE])
            .write(&[SOCKS5_VERSION, SOCKS5_AUTH_METHOD_NONE])
            .build();

        assert_eq!(negotiate(&mut stream).await.unwrap(), AuthMethod::None);
    }

    #[tokio::test]
    async fn test_negotiate_invalid_version_writes_nothing() {
        let mut stream = Builder::new().read(&[0x04, 1, 0]).build();

        let err = negotiate(&mut stream).await.unwrap_err();
        assert!(matches!(
            err,
            ProxyError::Protocol(Socks5Error::UnsupportedVersion(4))
        ));
    }

    #[tokio::test]
    async fn test_negotiate_method_count_too_high() {
        // Declares three methods, sends one, then closes
        let mut stream = Builder::new().read(&[SOCKS5_VERSION, 3, 0]).build();

        let err = negotiate(&mut stream).await.unwrap_err();
        assert!(matches!(err, ProxyError::Protocol(Socks5Error::Truncated(3))));
    }

    #[tokio::test]
    async fn test_negotiate_method_count_too_low() {
        let mut stream = Builder::new().read(&[SOCKS5_VERSION, 1, 0, 2]).build();

        let err = negotiate(&mut stream).await.unwrap_err();
        assert!(matches!(
            err,
            ProxyError::Protocol(Socks5Error::LengthMismatch {
                expected: 3,
                actual: 4
            })
        ));
    }

    #[tokio::test]
    async fn test_negotiate_zero_methods() {
        let mut stream = Builder::new().read(&[SOCKS5_VERSION, 0]).build();

        let err = negotiate(&mut stream).await.unwrap_err();
        assert!(matches!(err, ProxyError::Protocol(Socks5Error::NoMethods)));
    }
}
