use chrono::DateTime;
use proptest::prelude::*;
use tbase::codec::{
    decode_float, decode_float_vector, decode_timestamp, encode_float, encode_float_vector,
    encode_timestamp,
};

// Keep within chrono's representable range.
const MAX_SECS: i64 = 253_402_300_799;
const MIN_SECS: i64 = -62_135_596_800;

fn timestamp() -> impl Strategy<Value = DateTime<chrono::Utc>> {
    (MIN_SECS..=MAX_SECS, 0u32..1_000_000_000)
        .prop_map(|(secs, nanos)| DateTime::from_timestamp(secs, nanos).unwrap())
}

proptest! {
    #[test]
    fn prop_float_bits_roundtrip(bits in any::<u64>()) {
        let value = f64::from_bits(bits);
        prop_assert_eq!(decode_float(encode_float(value)).to_bits(), bits);
    }

    #[test]
    fn prop_vector_roundtrip(bits in prop::collection::vec(any::<u64>(), 0..16)) {
        let values: Vec<f64> = bits.iter().copied().map(f64::from_bits).collect();
        let encoded = encode_float_vector(&values);
        prop_assert_eq!(encoded.len(), values.len() * 8);

        let decoded: Vec<u64> = decode_float_vector(&encoded)
            .unwrap()
            .into_iter()
            .map(f64::to_bits)
            .collect();
        prop_assert_eq!(decoded, bits);
    }

    #[test]
    fn prop_timestamp_order_preserved(a in timestamp(), b in timestamp()) {
        let (ka, kb) = (encode_timestamp(a), encode_timestamp(b));
        prop_assert_eq!(a.cmp(&b), ka.cmp(&kb));
    }

    #[test]
    fn prop_timestamp_roundtrip(t in timestamp()) {
        prop_assert_eq!(decode_timestamp(&encode_timestamp(t)).unwrap(), t);
    }
}
