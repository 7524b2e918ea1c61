//! Digit counting and emission for radices 1 through 32.

use crate::buffer::Buf;

/// Radix validated to lie in `1..=32`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Radix(u8);

impl Radix {
    pub(crate) const BIN: Self = Self(2);
    pub(crate) const OCT: Self = Self(8);
    pub(crate) const DEC: Self = Self(10);
    pub(crate) const HEX: Self = Self(16);

    /// Returns `None` for radices outside `1..=32`.
    pub(crate) fn new(base: u8) -> Option<Self> {
        (1..=32).contains(&base).then_some(Self(base))
    }

    pub(crate) fn get(self) -> u8 {
        self.0
    }
}

const DIGITS_LOWER: &[u8; 32] = b"0123456789abcdefghijklmnopqrstuv";
const DIGITS_UPPER: &[u8; 32] = b"0123456789ABCDEFGHIJKLMNOPQRSTUV";

/// All two-digit decimal numbers, so base 10 emits digit pairs.
const DIGIT_PAIRS: &[u8; 200] = b"\
    0001020304050607080910111213141516171819\
    2021222324252627282930313233343536373839\
    4041424344454647484950515253545556575859\
    6061626364656667686970717273747576777879\
    8081828384858687888990919293949596979899";

/// Powers of ten that fit in a `u64`.
const POW10: [u64; 20] = {
    let mut table = [1_u64; 20];
    let mut i = 1;
    while i < 20 {
        table[i] = table[i - 1] * 10;
        i += 1;
    }
    table
};

/// Unary output is capped at this many `1` bytes; larger values get an
/// ellipsis marker appended.
const UNARY_CAP: u64 = 64;
const ELLIPSIS: &[u8] = b"...";

/// Number of digits needed to render `value` in base `B`.
fn count_in<const B: u64>(value: u64) -> usize {
    if value == 0 {
        return 1;
    }
    if B == 1 {
        let ones = value.min(UNARY_CAP) as usize;
        return if value > UNARY_CAP {
            ones + ELLIPSIS.len()
        } else {
            ones
        };
    }
    let bits = (64 - value.leading_zeros()) as usize;
    if B == 10 {
        // floor(log10(2^bits)) approximation, corrected by a power table.
        let approx = bits * 1233 >> 12;
        approx + 1 - usize::from(value < POW10[approx])
    } else if B.is_power_of_two() {
        let shift = B.trailing_zeros() as usize;
        (bits + shift - 1) / shift
    } else {
        // Divide out four digits per step, then place the remainder.
        let stride = B * B * B * B;
        let mut count = 1;
        let mut value = value;
        while value >= stride {
            value /= stride;
            count += 4;
        }
        count
            + usize::from(value >= B)
            + usize::from(value >= B * B)
            + usize::from(value >= B * B * B)
    }
}

/// Emits the base-`B` representation of `value` at the buffer tail.
fn write_in<const B: u64>(buf: &mut dyn Buf, value: u64, upper: bool) {
    if B == 1 {
        if value == 0 {
            buf.push(b'0');
        } else {
            buf.fill(value.min(UNARY_CAP) as usize, b'1');
            if value > UNARY_CAP {
                buf.append(ELLIPSIS);
            }
        }
        return;
    }

    let count = count_in::<B>(value);
    let start = buf.len();
    buf.resize(start + count, 0);
    let out = &mut buf.as_mut_slice()[start..];
    let mut value = value;

    if B == 10 {
        let mut i = count;
        while value >= 100 {
            let pair = (value % 100) as usize * 2;
            value /= 100;
            out[i - 2] = DIGIT_PAIRS[pair];
            out[i - 1] = DIGIT_PAIRS[pair + 1];
            i -= 2;
        }
        if value >= 10 {
            let pair = value as usize * 2;
            out[0] = DIGIT_PAIRS[pair];
            out[1] = DIGIT_PAIRS[pair + 1];
        } else {
            out[0] = b'0' + value as u8;
        }
        return;
    }

    let alphabet = if upper { DIGITS_UPPER } else { DIGITS_LOWER };
    let mut i = count;
    if B.is_power_of_two() {
        let shift = B.trailing_zeros();
        let mask = B - 1;
        loop {
            out[i - 1] = alphabet[(value & mask) as usize];
            value >>= shift;
            i -= 1;
            if i == 0 {
                break;
            }
        }
    } else {
        loop {
            out[i - 1] = alphabet[(value % B) as usize];
            value /= B;
            i -= 1;
            if i == 0 {
                break;
            }
        }
    }
}

/// Expands to a 32-arm jump table over the monomorphized per-radix
/// renderers.
macro_rules! radix_jump {
    ($radix:expr, $func:ident($($args:expr),*)) => {
        match $radix.get() {
            1 => $func::<1>($($args),*),
            2 => $func::<2>($($args),*),
            3 => $func::<3>($($args),*),
            4 => $func::<4>($($args),*),
            5 => $func::<5>($($args),*),
            6 => $func::<6>($($args),*),
            7 => $func::<7>($($args),*),
            8 => $func::<8>($($args),*),
            9 => $func::<9>($($args),*),
            10 => $func::<10>($($args),*),
            11 => $func::<11>($($args),*),
            12 => $func::<12>($($args),*),
            13 => $func::<13>($($args),*),
            14 => $func::<14>($($args),*),
            15 => $func::<15>($($args),*),
            16 => $func::<16>($($args),*),
            17 => $func::<17>($($args),*),
            18 => $func::<18>($($args),*),
            19 => $func::<19>($($args),*),
            20 => $func::<20>($($args),*),
            21 => $func::<21>($($args),*),
            22 => $func::<22>($($args),*),
            23 => $func::<23>($($args),*),
            24 => $func::<24>($($args),*),
            25 => $func::<25>($($args),*),
            26 => $func::<26>($($args),*),
            27 => $func::<27>($($args),*),
            28 => $func::<28>($($args),*),
            29 => $func::<29>($($args),*),
            30 => $func::<30>($($args),*),
            31 => $func::<31>($($args),*),
            32 => $func::<32>($($args),*),
            _ => unreachable!(), // Radix is validated at construction
        }
    };
}

/// Number of digits [`write_digits`] will emit for `value` in `radix`.
pub(crate) fn count_digits(radix: Radix, value: u64) -> usize {
    radix_jump!(radix, count_in(value))
}

/// Appends the rendering of `value` in `radix` to `buf`.
pub(crate) fn write_digits(buf: &mut dyn Buf, radix: Radix, value: u64, upper: bool) {
    radix_jump!(radix, write_in(buf, value, upper));
}
