//! Referee codes: six uppercase alphanumerics, unique across tournaments.

use crate::store::Store;
use rand::Rng;

pub const CODE_LEN: usize = 6;
const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// One random code. May collide with an existing one.
pub fn draw_code<R: Rng + ?Sized>(rng: &mut R) -> String {
    (0..CODE_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

/// Draw until the code is not used by any tournament. With 36^6 codes this
/// almost always succeeds first time.
pub async fn generate_unique_code(store: &Store) -> String {
    loop {
        let code = draw_code(&mut rand::thread_rng());
        let taken = store
            .tournaments
            .find_one(|t| t.referee_code == code)
            .await
            .is_some();
        if !taken {
            return code;
        }
        log::debug!("Referee code {} already taken, drawing again", code);
    }
}
