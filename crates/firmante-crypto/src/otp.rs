//! Numeric one-time codes (C2).

use rand::Rng;

/// Mint a 6-digit decimal OTP, uniformly distributed in `[100000, 999999]`.
pub fn mint_otp6() -> String {
    let n: u32 = rand::thread_rng().gen_range(100_000..=999_999);
    n.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_otp_is_six_digits() {
        for _ in 0..50 {
            let otp = mint_otp6();
            assert_eq!(otp.len(), 6);
            assert!(otp.chars().all(|c| c.is_ascii_digit()));
            let n: u32 = otp.parse().unwrap();
            assert!((100_000..=999_999).contains(&n));
        }
    }
}
