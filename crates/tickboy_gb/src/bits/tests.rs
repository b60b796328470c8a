use super::*;

#[derive(Clone, Copy)]
enum Sample {
    B0,
    B1,
    B2,
}

impl Bit for Sample {
    fn index(self) -> u32 {
        self as u32
    }
}

#[test]
fn mask_and_test_reject_out_of_range_indices() {
    assert_eq!(mask(0).unwrap(), 1);
    assert_eq!(mask(31).unwrap(), 0x8000_0000);
    assert!(mask(32).is_err());
    assert!(test(0, 32).is_err());
    assert!(set(0, 40, true).is_err());
}

#[test]
fn set_and_test_agree() {
    let v = set(0, 5, true).unwrap();
    assert_eq!(v, 0b10_0000);
    assert!(test(v, 5).unwrap());
    assert_eq!(set(v, 5, false).unwrap(), 0);
}

#[test]
fn enumerated_bits_use_their_discriminant() {
    let v = set_bit(0, Sample::B2, true);
    assert_eq!(v, 0b100);
    assert!(test_bit(v, Sample::B2));
    assert!(!test_bit(v, Sample::B1));
    assert_eq!(set_bit(0xFF, Sample::B0, false), 0xFE);
}

#[test]
fn clip_keeps_low_bits() {
    assert_eq!(clip(0, 0xFFFF_FFFF).unwrap(), 0);
    assert_eq!(clip(4, 0xABCD).unwrap(), 0xD);
    assert_eq!(clip(32, 0xDEAD_BEEF).unwrap(), 0xDEAD_BEEF);
    assert!(clip(33, 1).is_err());
}

#[test]
fn extract_takes_a_window() {
    assert_eq!(extract(0xABCD_1234, 8, 8).unwrap(), 0x12);
    assert_eq!(extract(0xABCD_1234, 28, 4).unwrap(), 0xA);
    assert_eq!(extract(0xABCD_1234, 0, 32).unwrap(), 0xABCD_1234);
    assert_eq!(extract(0xABCD_1234, 31, 0).unwrap(), 0);
    assert_eq!(extract(0xFFFF_FFFF, 32, 0).unwrap(), 0);
    assert!(extract(0, 32, 1).is_err());
    assert!(extract(0, 30, 4).is_err());
}

#[test]
fn rotate_wraps_within_size() {
    assert_eq!(rotate(4, 0b1001, 1).unwrap(), 0b0011);
    assert_eq!(rotate(4, 0b1001, -1).unwrap(), 0b1100);
    assert_eq!(rotate(8, 0x81, 4).unwrap(), 0x18);
    assert_eq!(rotate(32, 0x8000_0001, 1).unwrap(), 0x0000_0003);
    assert_eq!(rotate(8, 0xA5, 0).unwrap(), 0xA5);
    assert!(rotate(0, 0, 1).is_err());
    assert!(rotate(4, 0x10, 1).is_err());
}

#[test]
fn rotate_by_opposite_distances_is_identity() {
    for size in [1u32, 3, 8, 16, 32] {
        let v = 0xDEAD_BEEFu32 & low_mask(size);
        for d in [-40, -9, -1, 0, 1, 7, 33] {
            let there = rotate(size, v, d).unwrap();
            assert_eq!(rotate(size, there, -d).unwrap(), v, "size {size} d {d}");
        }
    }
}

#[test]
fn byte_helpers() {
    assert_eq!(sign_extend8(0x7F), 0x7F);
    assert_eq!(sign_extend8(0x80), 0xFFFF_FF80);
    assert_eq!(reverse8(0b0000_0001), 0b1000_0000);
    assert_eq!(reverse8(0b1100_1010), 0b0101_0011);
    assert_eq!(complement8(0x0F), 0xF0);
    assert_eq!(make16(0x12, 0x34), 0x1234);
}

#[test]
fn reverse8_is_an_involution() {
    for b in 0..=255u8 {
        assert_eq!(reverse8(reverse8(b)), b);
    }
}

fn vector(words: &[u32]) -> BitVector {
    let mut builder = BitVector::builder(words.len() * 32).unwrap();
    for (i, w) in words.iter().enumerate() {
        for (j, b) in w.to_le_bytes().into_iter().enumerate() {
            builder.set_byte(i * 4 + j, b).unwrap();
        }
    }
    builder.build()
}

#[test]
fn bit_vector_size_must_be_a_multiple_of_32() {
    assert!(BitVector::new(0, false).is_err());
    assert!(BitVector::new(33, true).is_err());
    assert!(BitVector::builder(48).is_err());
    assert_eq!(BitVector::new(96, true).unwrap().size(), 96);
}

#[test]
fn builder_places_bytes_little_endian() {
    let v = vector(&[0x1234_5678]);
    assert!(v.test_bit(3).unwrap());
    assert!(!v.test_bit(0).unwrap());
    assert!(v.test_bit(28).unwrap());
    assert!(v.test_bit(32).is_err());
    assert_eq!(v.to_string(), format!("{:032b}", 0x1234_5678u32));
}

#[test]
fn builder_bits_match_every_byte_at_every_position() {
    for value in 0..=255u8 {
        for position in 0..8 {
            let mut builder = BitVector::builder(64).unwrap();
            builder.set_byte(position, value).unwrap();
            let v = builder.build();
            for i in 0..64 {
                let expected = i / 8 == position && (value >> (i % 8)) & 1 == 1;
                assert_eq!(v.test_bit(i).unwrap(), expected, "byte {value:#04X} at {position}, bit {i}");
            }
        }
    }
}

#[test]
fn builder_bits_match_a_mixed_byte_stream() {
    let mut seed = 0x2545_F491u32;
    let bytes: Vec<u8> = (0..64)
        .map(|_| {
            seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            (seed >> 24) as u8
        })
        .collect();
    let mut builder = BitVector::builder(bytes.len() * 8).unwrap();
    for (i, &b) in bytes.iter().enumerate() {
        builder.set_byte(i, b).unwrap();
    }
    let v = builder.build();
    for i in 0..v.size() {
        assert_eq!(v.test_bit(i).unwrap(), (bytes[i / 8] >> (i % 8)) & 1 == 1, "bit {i}");
    }
}

#[test]
fn builder_rejects_bytes_past_the_end() {
    let mut builder = BitVector::builder(32).unwrap();
    assert!(builder.set_byte(4, 1).is_err());
}

#[test]
fn boolean_operations() {
    let a = vector(&[0xFF00_FF00, 0x0000_FFFF]);
    let b = vector(&[0x0F0F_0F0F, 0xFFFF_0000]);
    assert_eq!(a.not(), vector(&[0x00FF_00FF, 0xFFFF_0000]));
    assert_eq!(a.and(&b).unwrap(), vector(&[0x0F00_0F00, 0]));
    assert_eq!(a.or(&b).unwrap(), vector(&[0xFF0F_FF0F, 0xFFFF_FFFF]));
    assert!(a.and(&BitVector::zeros(32).unwrap()).is_err());
}

#[test]
fn shift_moves_bits_towards_higher_indices() {
    let v = vector(&[0xABCD_00FF, 0x1212_ABCD]);
    assert_eq!(v.shift(16), vector(&[0x00FF_0000, 0xABCD_ABCD]));
    assert_eq!(v.shift(-16), vector(&[0xABCD_ABCD, 0x0000_1212]));
    assert_eq!(v.shift(64), BitVector::zeros(64).unwrap());
    assert_eq!(v.shift(0), v);
}

#[test]
fn extract_zero_extended_pads_with_zeros() {
    let v = vector(&[0xFFFF_FFFF]);
    assert_eq!(
        v.extract_zero_extended(-32, 64).unwrap(),
        vector(&[0, 0xFFFF_FFFF])
    );
    assert_eq!(
        v.extract_zero_extended(8, 32).unwrap(),
        vector(&[0x00FF_FFFF])
    );
}

#[test]
fn extract_wrapped_is_periodic() {
    let v = vector(&[0x1234_5678, 0x9ABC_DEF0]);
    for start in [-100isize, -33, -1, 0, 5, 31, 64, 77] {
        let here = v.extract_wrapped(start, 64).unwrap();
        let there = v.extract_wrapped(start + v.size() as isize, 64).unwrap();
        assert_eq!(here, there, "start {start}");
    }
    assert_eq!(v.extract_wrapped(32, 64).unwrap(), vector(&[0x9ABC_DEF0, 0x1234_5678]));
    assert!(v.extract_wrapped(0, 40).is_err());
}

#[test]
fn equality_follows_content() {
    use std::collections::HashSet;

    let a = vector(&[1, 2]);
    let b = vector(&[1, 2]);
    assert_eq!(a, b);
    assert_ne!(a, vector(&[1, 3]));
    let set: HashSet<_> = [a, b].into_iter().collect();
    assert_eq!(set.len(), 1);
}
