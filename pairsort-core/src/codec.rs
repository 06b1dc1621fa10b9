/// Compact share tokens for finished rankings.
///
/// A token is URL-safe base64 (no padding) over two bytes per entry:
/// item ID, then rank clamped to 0..=255. Decoding also accepts the older
/// one-byte-per-item layout, recognised by its odd length, where ranks are
/// implied by position.
use base64::alphabet;
use base64::engine::general_purpose::{GeneralPurpose, GeneralPurposeConfig, URL_SAFE_NO_PAD};
use base64::engine::DecodePaddingMode;
use base64::Engine as _;

use crate::constants::MAX_ENCODED_RANK;
use crate::types::{Item, ItemRegistry, Ranking};

/// Standard alphabet, padding optional, stray trailing bits ignored.
/// Tokens are mapped back from the URL-safe characters before decoding.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Encode `(item, rank)` pairs. Extra items or ranks beyond the shorter
/// slice are ignored.
pub fn serialize(items: &[Item], ranks: &[u32]) -> String {
    let bytes: Vec<u8> = items
        .iter()
        .zip(ranks)
        .flat_map(|(item, &rank)| [item.id, rank.min(MAX_ENCODED_RANK) as u8])
        .collect();
    URL_SAFE_NO_PAD.encode(bytes)
}

pub fn serialize_ranking(ranking: &Ranking) -> String {
    serialize(&ranking.items, &ranking.ranks)
}

/// Decode a token against `registry`.
///
/// IDs missing from the registry are skipped. Any malformed token yields an
/// empty ranking; this never fails.
pub fn deserialize(token: &str, registry: &ItemRegistry) -> Ranking {
    let base64: String = token
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .map(|c| match c {
            '-' => '+',
            '_' => '/',
            other => other,
        })
        .collect();
    if base64.is_empty() {
        return Ranking::default();
    }
    // Padding is optional, but when present it must complete the last quantum
    if base64.contains('=') && base64.len() % 4 != 0 {
        tracing::debug!(len = base64.len(), "discarding share token with partial padding");
        return Ranking::default();
    }

    let bytes = match LENIENT.decode(base64.as_bytes()) {
        Ok(bytes) => bytes,
        Err(e) => {
            tracing::debug!(error = %e, "discarding malformed share token");
            return Ranking::default();
        }
    };

    let mut ranking = Ranking::default();
    if bytes.len() % 2 == 1 {
        // Legacy layout: IDs only, ranked by position among known items
        for &id in &bytes {
            if let Some(item) = registry.by_id(id) {
                ranking.items.push(item.clone());
                ranking.ranks.push(ranking.items.len() as u32);
            }
        }
    } else {
        for pair in bytes.chunks_exact(2) {
            let (id, rank) = (pair[0], pair[1]);
            if let Some(item) = registry.by_id(id) {
                ranking.items.push(item.clone());
                ranking.ranks.push(if rank == 0 { 1 } else { u32::from(rank) });
            }
        }
    }
    ranking
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry(count: usize) -> ItemRegistry {
        let labels: Vec<String> = (0..count).map(|i| format!("item {i}")).collect();
        ItemRegistry::from_entries(&labels).unwrap()
    }

    fn ids(ranking: &Ranking) -> Vec<u8> {
        ranking.items.iter().map(|i| i.id).collect()
    }

    #[test]
    fn test_serialize_known_bytes() {
        let reg = registry(4);
        let items = vec![reg.get(3).clone(), reg.get(0).clone()];
        // bytes [3, 1, 0, 2]
        assert_eq!(serialize(&items, &[1, 2]), "AwEAAg");
    }

    #[test]
    fn test_serialize_uses_url_safe_alphabet() {
        let reg = ItemRegistry::new(vec![Item::new(251, "x", ""), Item::new(255, "y", "")]).unwrap();
        // bytes [251, 255, 255, 255] are "+////w" in standard base64
        let token = serialize(reg.items(), &[255, 300]);
        assert_eq!(token, "-____w");
        let decoded = deserialize(&token, &reg);
        assert_eq!(ids(&decoded), vec![251, 255]);
        assert_eq!(decoded.ranks, vec![255, 255]);
    }

    #[test]
    fn test_serialize_truncates_to_shorter_input() {
        let reg = registry(3);
        let token = serialize(reg.items(), &[1]);
        assert_eq!(deserialize(&token, &reg).len(), 1);
    }

    #[test]
    fn test_round_trip_with_ties() {
        let reg = registry(6);
        let items = vec![reg.get(4).clone(), reg.get(1).clone(), reg.get(5).clone()];
        let ranks = vec![1, 1, 2];
        let decoded = deserialize(&serialize(&items, &ranks), &reg);
        assert_eq!(decoded.items, items);
        assert_eq!(decoded.ranks, ranks);
    }

    #[test]
    fn test_decode_legacy_odd_length() {
        let reg = registry(5);
        // three IDs, one unknown
        let token = URL_SAFE_NO_PAD.encode([2u8, 200, 4]);
        let decoded = deserialize(&token, &reg);
        assert_eq!(ids(&decoded), vec![2, 4]);
        assert_eq!(decoded.ranks, vec![1, 2]);
    }

    #[test]
    fn test_decode_zero_rank_becomes_one() {
        let reg = registry(3);
        let token = URL_SAFE_NO_PAD.encode([1u8, 0, 2, 3]);
        let decoded = deserialize(&token, &reg);
        assert_eq!(decoded.ranks, vec![1, 3]);
    }

    #[test]
    fn test_decode_skips_unknown_ids() {
        let reg = registry(2);
        let token = URL_SAFE_NO_PAD.encode([9u8, 1, 1, 2]);
        let decoded = deserialize(&token, &reg);
        assert_eq!(ids(&decoded), vec![1]);
        assert_eq!(decoded.ranks, vec![2]);
    }

    #[test]
    fn test_decode_accepts_padding_and_standard_chars() {
        let reg = registry(4);
        assert_eq!(ids(&deserialize("AwEAAg==", &reg)), vec![3, 0]);
        assert_eq!(ids(&deserialize(" AwEA\nAg ", &reg)), vec![3, 0]);
    }

    #[test]
    fn test_decode_malformed_is_empty() {
        let reg = registry(4);
        assert!(deserialize("", &reg).is_empty());
        assert!(deserialize("!!!", &reg).is_empty());
        assert!(deserialize("A", &reg).is_empty());
        assert!(deserialize("AwE=AAg", &reg).is_empty());
        assert!(deserialize("AwEAAg=", &reg).is_empty());
        assert!(deserialize("AwEAAg===", &reg).is_empty());
    }
}
