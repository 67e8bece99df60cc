//! The Well-Known-Binary codec.
//!
//! Every top-level object starts with a one-byte endian flag (`0x00` big,
//! `0x01` little), a two-byte type code, and a type-specific payload. The
//! hex variant is the byte stream as uppercase hex.

mod reader;
mod writer;

use reader::{decode_hex, WkbReader};
use writer::{encode_hex, WkbWriter};

use crate::base::{Geog, Geom, NPoint, Point};
use crate::boxes::{STBox, TBox};
use crate::collections::base::{Span, SpanSet, SpanValue};
use crate::collections::datetime::{TsTzSpan, TsTzSpanSet};
use crate::errors::{Error, Result};
use crate::temporal::{BaseValue, TInstant, TInterpolation, TSequence, TSequenceSet, Temporal};
use crate::WKBVariant;

// type codes
pub(crate) const WKB_SPAN_INT: u16 = 0x0011;
pub(crate) const WKB_SPAN_FLOAT: u16 = 0x0012;
pub(crate) const WKB_SPAN_TSTZ: u16 = 0x0013;
pub(crate) const WKB_SPANSET_INT: u16 = 0x0021;
pub(crate) const WKB_SPANSET_FLOAT: u16 = 0x0022;
pub(crate) const WKB_SPANSET_TSTZ: u16 = 0x0023;
pub(crate) const WKB_TBOX: u16 = 0x0031;
pub(crate) const WKB_STBOX: u16 = 0x0032;
pub(crate) const WKB_TBOOL: u16 = 0x0041;
pub(crate) const WKB_TINT: u16 = 0x0042;
pub(crate) const WKB_TINT8: u16 = 0x0043;
pub(crate) const WKB_TFLOAT: u16 = 0x0044;
pub(crate) const WKB_TTEXT: u16 = 0x0045;
pub(crate) const WKB_TGEOMPOINT: u16 = 0x0046;
pub(crate) const WKB_TGEOGPOINT: u16 = 0x0047;
pub(crate) const WKB_TNPOINT: u16 = 0x0048;

// temporal flag bits
const WKB_SUBTYPE_MASK: u8 = 0x03;
const WKB_INTERP_SHIFT: u8 = 2;
const WKB_INTERP_MASK: u8 = 0x0C;
const WKB_HAS_Z: u8 = 0x10;
const WKB_GEODETIC: u8 = 0x20;
const WKB_HAS_SRID: u8 = 0x40;

const SUBTYPE_INSTANT: u8 = 1;
const SUBTYPE_SEQUENCE: u8 = 2;
const SUBTYPE_SEQUENCE_SET: u8 = 3;

fn interp_code(interp: TInterpolation) -> u8 {
    match interp {
        TInterpolation::None => 0,
        TInterpolation::Discrete => 1,
        TInterpolation::Stepwise => 2,
        TInterpolation::Linear => 3,
    }
}

fn interp_from_code(code: u8) -> Result<TInterpolation> {
    match code {
        0 => Ok(TInterpolation::None),
        1 => Ok(TInterpolation::Discrete),
        2 => Ok(TInterpolation::Stepwise),
        3 => Ok(TInterpolation::Linear),
        other => Err(Error::BadWkbFlags(other << WKB_INTERP_SHIFT)),
    }
}

/// Base-value codec used inside temporal payloads.
pub(crate) trait WkbValue: Sized {
    const TEMPORAL_CODE: u16;
    const GEODETIC: bool = false;

    fn wkb_has_z(&self) -> bool {
        false
    }

    fn wkb_srid(&self) -> i32 {
        0
    }

    fn write_value(&self, writer: &mut WkbWriter);

    fn read_value(reader: &mut WkbReader, has_z: bool, srid: i32) -> Result<Self>;
}

impl WkbValue for bool {
    const TEMPORAL_CODE: u16 = WKB_TBOOL;

    fn write_value(&self, writer: &mut WkbWriter) {
        writer.write_u8(*self as u8);
    }

    fn read_value(reader: &mut WkbReader, _has_z: bool, _srid: i32) -> Result<Self> {
        match reader.read_u8()? {
            0 => Ok(false),
            1 => Ok(true),
            other => Err(Error::BadWkbFlags(other)),
        }
    }
}

impl WkbValue for i32 {
    const TEMPORAL_CODE: u16 = WKB_TINT;

    fn write_value(&self, writer: &mut WkbWriter) {
        writer.write_i32(*self);
    }

    fn read_value(reader: &mut WkbReader, _has_z: bool, _srid: i32) -> Result<Self> {
        reader.read_i32()
    }
}

impl WkbValue for i64 {
    const TEMPORAL_CODE: u16 = WKB_TINT8;

    fn write_value(&self, writer: &mut WkbWriter) {
        writer.write_i64(*self);
    }

    fn read_value(reader: &mut WkbReader, _has_z: bool, _srid: i32) -> Result<Self> {
        reader.read_i64()
    }
}

impl WkbValue for f64 {
    const TEMPORAL_CODE: u16 = WKB_TFLOAT;

    fn write_value(&self, writer: &mut WkbWriter) {
        writer.write_f64(*self);
    }

    fn read_value(reader: &mut WkbReader, _has_z: bool, _srid: i32) -> Result<Self> {
        reader.read_f64()
    }
}

impl WkbValue for String {
    const TEMPORAL_CODE: u16 = WKB_TTEXT;

    fn write_value(&self, writer: &mut WkbWriter) {
        writer.write_i64(self.len() as i64);
        writer.write_bytes(self.as_bytes());
    }

    fn read_value(reader: &mut WkbReader, _has_z: bool, _srid: i32) -> Result<Self> {
        let len = reader.read_i64()?;
        let len = usize::try_from(len)
            .map_err(|_| Error::parse(format!("bad text length: {len}")))?;
        let bytes = reader.read_bytes(len)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|_| Error::parse("text payload is not valid UTF-8"))
    }
}

fn write_point(point: &Point, writer: &mut WkbWriter) {
    writer.write_f64(point.x);
    writer.write_f64(point.y);
    if let Some(z) = point.z {
        writer.write_f64(z);
    }
}

fn read_point(reader: &mut WkbReader, has_z: bool, srid: i32) -> Result<Point> {
    let x = reader.read_f64()?;
    let y = reader.read_f64()?;
    let mut point = if has_z {
        Point::new_3d(x, y, reader.read_f64()?)
    } else {
        Point::new(x, y)
    };
    point.srid = srid;
    Ok(point)
}

impl WkbValue for Geom {
    const TEMPORAL_CODE: u16 = WKB_TGEOMPOINT;

    fn wkb_has_z(&self) -> bool {
        self.0.has_z()
    }

    fn wkb_srid(&self) -> i32 {
        self.0.srid
    }

    fn write_value(&self, writer: &mut WkbWriter) {
        write_point(&self.0, writer);
    }

    fn read_value(reader: &mut WkbReader, has_z: bool, srid: i32) -> Result<Self> {
        read_point(reader, has_z, srid).map(Geom)
    }
}

impl WkbValue for Geog {
    const TEMPORAL_CODE: u16 = WKB_TGEOGPOINT;
    const GEODETIC: bool = true;

    fn wkb_has_z(&self) -> bool {
        self.0.has_z()
    }

    fn wkb_srid(&self) -> i32 {
        self.0.srid
    }

    fn write_value(&self, writer: &mut WkbWriter) {
        write_point(&self.0, writer);
    }

    fn read_value(reader: &mut WkbReader, has_z: bool, srid: i32) -> Result<Self> {
        read_point(reader, has_z, srid).map(Geog)
    }
}

impl WkbValue for NPoint {
    const TEMPORAL_CODE: u16 = WKB_TNPOINT;

    fn write_value(&self, writer: &mut WkbWriter) {
        writer.write_i64(self.route());
        writer.write_f64(self.position());
    }

    fn read_value(reader: &mut WkbReader, _has_z: bool, _srid: i32) -> Result<Self> {
        let rid = reader.read_i64()?;
        let pos = reader.read_f64()?;
        NPoint::new(rid, pos)
    }
}

fn bounds_byte(lower_inc: bool, upper_inc: bool) -> u8 {
    (lower_inc as u8) | ((upper_inc as u8) << 1)
}

fn bounds_from_byte(byte: u8) -> Result<(bool, bool)> {
    if byte & !0x03 != 0 {
        return Err(Error::BadWkbFlags(byte));
    }
    Ok((byte & 0x01 != 0, byte & 0x02 != 0))
}

impl<V: BaseValue + WkbValue> Temporal<V> {
    /// Serialize in the Well-Known-Binary format.
    pub fn as_wkb(&self, variant: WKBVariant) -> Vec<u8> {
        let mut writer = WkbWriter::new(!variant.contains(WKBVariant::XDR));
        writer.write_u16(V::TEMPORAL_CODE);
        let first = self.start_instant().value();
        let srid = first.wkb_srid();
        let mut flags = match self {
            Temporal::Instant(_) => SUBTYPE_INSTANT,
            Temporal::Sequence(_) => SUBTYPE_SEQUENCE,
            Temporal::SequenceSet(_) => SUBTYPE_SEQUENCE_SET,
        };
        flags |= interp_code(self.interpolation()) << WKB_INTERP_SHIFT;
        if first.wkb_has_z() {
            flags |= WKB_HAS_Z;
        }
        if V::GEODETIC {
            flags |= WKB_GEODETIC;
        }
        if srid != 0 {
            flags |= WKB_HAS_SRID;
        }
        writer.write_u8(flags);
        if srid != 0 {
            writer.write_u32(srid as u32);
        }
        let write_instant = |inst: &TInstant<V>, writer: &mut WkbWriter| {
            inst.value().write_value(writer);
            writer.write_i64(inst.t_micros());
        };
        let write_sequence = |seq: &TSequence<V>, writer: &mut WkbWriter| {
            writer.write_u32(seq.num_instants() as u32);
            writer.write_u8(bounds_byte(seq.lower_inc(), seq.upper_inc()));
            for inst in seq.instants() {
                write_instant(inst, writer);
            }
        };
        match self {
            Temporal::Instant(inst) => write_instant(inst, &mut writer),
            Temporal::Sequence(seq) => write_sequence(seq, &mut writer),
            Temporal::SequenceSet(ss) => {
                writer.write_u32(ss.num_sequences() as u32);
                for seq in ss.sequences() {
                    write_sequence(seq, &mut writer);
                }
            }
        }
        writer.into_bytes()
    }

    /// Parse the Well-Known-Binary format.
    pub fn from_wkb(bytes: &[u8]) -> Result<Self> {
        let mut reader = WkbReader::new(bytes);
        reader.read_endian_flag()?;
        let code = reader.read_u16()?;
        if code != V::TEMPORAL_CODE {
            return Err(Error::BadWkbType(code));
        }
        let flags = reader.read_u8()?;
        let subtype = flags & WKB_SUBTYPE_MASK;
        let interp = interp_from_code((flags & WKB_INTERP_MASK) >> WKB_INTERP_SHIFT)?;
        let has_z = flags & WKB_HAS_Z != 0;
        let geodetic = flags & WKB_GEODETIC != 0;
        if geodetic != V::GEODETIC {
            return Err(Error::BadWkbFlags(flags));
        }
        let srid = if flags & WKB_HAS_SRID != 0 {
            reader.read_u32()? as i32
        } else {
            0
        };
        let read_instant = |reader: &mut WkbReader| -> Result<TInstant<V>> {
            let value = V::read_value(reader, has_z, srid)?;
            let t = reader.read_i64()?;
            Ok(TInstant::from_micros(value, t))
        };
        let read_sequence = |reader: &mut WkbReader| -> Result<TSequence<V>> {
            let count = reader.read_u32()? as usize;
            let (lower_inc, upper_inc) = bounds_from_byte(reader.read_u8()?)?;
            let mut instants = Vec::with_capacity(count);
            for _ in 0..count {
                instants.push(read_instant(reader)?);
            }
            if interp == TInterpolation::Discrete {
                TSequence::discrete(instants)
            } else {
                TSequence::new(instants, lower_inc, upper_inc, interp)
            }
        };
        let result = match subtype {
            SUBTYPE_INSTANT => Temporal::Instant(read_instant(&mut reader)?),
            SUBTYPE_SEQUENCE => Temporal::Sequence(read_sequence(&mut reader)?),
            SUBTYPE_SEQUENCE_SET => {
                let count = reader.read_u32()? as usize;
                let mut sequences = Vec::with_capacity(count);
                for _ in 0..count {
                    sequences.push(read_sequence(&mut reader)?);
                }
                Temporal::SequenceSet(TSequenceSet::new(sequences)?)
            }
            _ => return Err(Error::BadWkbFlags(flags)),
        };
        reader.expect_end()?;
        Ok(result)
    }

    /// Serialize as uppercase hex of the binary format.
    pub fn as_hexwkb(&self, variant: WKBVariant) -> String {
        encode_hex(&self.as_wkb(variant))
    }

    /// Parse the uppercase-hex form of the binary format.
    pub fn from_hexwkb(hex: &str) -> Result<Self> {
        Self::from_wkb(&decode_hex(hex)?)
    }
}

/// Scalar codec for span bounds.
pub(crate) trait WkbSpanScalar: SpanValue {
    const SPAN_CODE: u16;
    const SPANSET_CODE: u16;

    fn write_scalar(&self, writer: &mut WkbWriter);
    fn read_scalar(reader: &mut WkbReader) -> Result<Self>;
}

impl WkbSpanScalar for i32 {
    const SPAN_CODE: u16 = WKB_SPAN_INT;
    const SPANSET_CODE: u16 = WKB_SPANSET_INT;

    fn write_scalar(&self, writer: &mut WkbWriter) {
        writer.write_i32(*self);
    }

    fn read_scalar(reader: &mut WkbReader) -> Result<Self> {
        reader.read_i32()
    }
}

impl WkbSpanScalar for i64 {
    const SPAN_CODE: u16 = WKB_SPAN_TSTZ;
    const SPANSET_CODE: u16 = WKB_SPANSET_TSTZ;

    fn write_scalar(&self, writer: &mut WkbWriter) {
        writer.write_i64(*self);
    }

    fn read_scalar(reader: &mut WkbReader) -> Result<Self> {
        reader.read_i64()
    }
}

impl WkbSpanScalar for f64 {
    const SPAN_CODE: u16 = WKB_SPAN_FLOAT;
    const SPANSET_CODE: u16 = WKB_SPANSET_FLOAT;

    fn write_scalar(&self, writer: &mut WkbWriter) {
        writer.write_f64(*self);
    }

    fn read_scalar(reader: &mut WkbReader) -> Result<Self> {
        reader.read_f64()
    }
}

fn write_span_body<T: WkbSpanScalar>(span: &Span<T>, writer: &mut WkbWriter) {
    writer.write_u8(bounds_byte(span.lower_inc(), span.upper_inc()));
    span.lower().write_scalar(writer);
    span.upper().write_scalar(writer);
}

fn read_span_body<T: WkbSpanScalar>(reader: &mut WkbReader) -> Result<Span<T>> {
    let (lower_inc, upper_inc) = bounds_from_byte(reader.read_u8()?)?;
    let lower = T::read_scalar(reader)?;
    let upper = T::read_scalar(reader)?;
    Span::new(lower, upper, lower_inc, upper_inc)
}

impl<T: WkbSpanScalar> Span<T> {
    pub fn as_wkb(&self, variant: WKBVariant) -> Vec<u8> {
        let mut writer = WkbWriter::new(!variant.contains(WKBVariant::XDR));
        writer.write_u16(T::SPAN_CODE);
        write_span_body(self, &mut writer);
        writer.into_bytes()
    }

    pub fn from_wkb(bytes: &[u8]) -> Result<Self> {
        let mut reader = WkbReader::new(bytes);
        reader.read_endian_flag()?;
        let code = reader.read_u16()?;
        if code != T::SPAN_CODE {
            return Err(Error::BadWkbType(code));
        }
        let span = read_span_body(&mut reader)?;
        reader.expect_end()?;
        Ok(span)
    }

    pub fn as_hexwkb(&self, variant: WKBVariant) -> String {
        encode_hex(&self.as_wkb(variant))
    }

    pub fn from_hexwkb(hex: &str) -> Result<Self> {
        Self::from_wkb(&decode_hex(hex)?)
    }
}

impl<T: WkbSpanScalar> SpanSet<T> {
    pub fn as_wkb(&self, variant: WKBVariant) -> Vec<u8> {
        let mut writer = WkbWriter::new(!variant.contains(WKBVariant::XDR));
        writer.write_u16(T::SPANSET_CODE);
        writer.write_u32(self.num_spans() as u32);
        for span in self.spans() {
            write_span_body(span, &mut writer);
        }
        writer.into_bytes()
    }

    pub fn from_wkb(bytes: &[u8]) -> Result<Self> {
        let mut reader = WkbReader::new(bytes);
        reader.read_endian_flag()?;
        let code = reader.read_u16()?;
        if code != T::SPANSET_CODE {
            return Err(Error::BadWkbType(code));
        }
        let count = reader.read_u32()? as usize;
        let mut spans = Vec::with_capacity(count);
        for _ in 0..count {
            spans.push(read_span_body(&mut reader)?);
        }
        reader.expect_end()?;
        Ok(SpanSet::new(spans))
    }

    pub fn as_hexwkb(&self, variant: WKBVariant) -> String {
        encode_hex(&self.as_wkb(variant))
    }

    pub fn from_hexwkb(hex: &str) -> Result<Self> {
        Self::from_wkb(&decode_hex(hex)?)
    }
}

impl TsTzSpan {
    pub fn as_wkb(&self, variant: WKBVariant) -> Vec<u8> {
        self.inner.as_wkb(variant)
    }

    pub fn from_wkb(bytes: &[u8]) -> Result<Self> {
        Span::<i64>::from_wkb(bytes).map(TsTzSpan::from_inner)
    }

    pub fn as_hexwkb(&self, variant: WKBVariant) -> String {
        self.inner.as_hexwkb(variant)
    }

    pub fn from_hexwkb(hex: &str) -> Result<Self> {
        Span::<i64>::from_hexwkb(hex).map(TsTzSpan::from_inner)
    }
}

impl TsTzSpanSet {
    pub fn as_wkb(&self, variant: WKBVariant) -> Vec<u8> {
        self.inner.as_wkb(variant)
    }

    pub fn from_wkb(bytes: &[u8]) -> Result<Self> {
        SpanSet::<i64>::from_wkb(bytes).map(TsTzSpanSet::from_inner)
    }

    pub fn as_hexwkb(&self, variant: WKBVariant) -> String {
        self.inner.as_hexwkb(variant)
    }

    pub fn from_hexwkb(hex: &str) -> Result<Self> {
        SpanSet::<i64>::from_hexwkb(hex).map(TsTzSpanSet::from_inner)
    }
}

// box flag bits
const WKB_BOX_HAS_X: u8 = 0x01;
const WKB_BOX_HAS_T: u8 = 0x02;
const WKB_BOX_HAS_Z: u8 = 0x04;
const WKB_BOX_GEODETIC: u8 = 0x08;
const WKB_BOX_HAS_SRID: u8 = 0x10;

impl TBox {
    pub fn as_wkb(&self, variant: WKBVariant) -> Vec<u8> {
        let mut writer = WkbWriter::new(!variant.contains(WKBVariant::XDR));
        writer.write_u16(WKB_TBOX);
        let mut flags = 0u8;
        if self.has_x() {
            flags |= WKB_BOX_HAS_X;
        }
        if self.has_t() {
            flags |= WKB_BOX_HAS_T;
        }
        writer.write_u8(flags);
        if let Some(span) = self.value_span() {
            write_span_body(&span, &mut writer);
        }
        if let Some(period) = self.tstz_span() {
            write_span_body(&period.inner, &mut writer);
        }
        writer.into_bytes()
    }

    pub fn from_wkb(bytes: &[u8]) -> Result<Self> {
        let mut reader = WkbReader::new(bytes);
        reader.read_endian_flag()?;
        let code = reader.read_u16()?;
        if code != WKB_TBOX {
            return Err(Error::BadWkbType(code));
        }
        let flags = reader.read_u8()?;
        if flags & !(WKB_BOX_HAS_X | WKB_BOX_HAS_T) != 0 {
            return Err(Error::BadWkbFlags(flags));
        }
        let span = if flags & WKB_BOX_HAS_X != 0 {
            Some(read_span_body::<f64>(&mut reader)?)
        } else {
            None
        };
        let period = if flags & WKB_BOX_HAS_T != 0 {
            Some(read_span_body::<i64>(&mut reader)?)
        } else {
            None
        };
        reader.expect_end()?;
        if span.is_none() && period.is_none() {
            return Err(Error::BadWkbFlags(flags));
        }
        Ok(TBox::from_raw(span, period))
    }

    pub fn as_hexwkb(&self, variant: WKBVariant) -> String {
        encode_hex(&self.as_wkb(variant))
    }

    pub fn from_hexwkb(hex: &str) -> Result<Self> {
        Self::from_wkb(&decode_hex(hex)?)
    }
}

impl STBox {
    pub fn as_wkb(&self, variant: WKBVariant) -> Vec<u8> {
        let mut writer = WkbWriter::new(!variant.contains(WKBVariant::XDR));
        writer.write_u16(WKB_STBOX);
        let mut flags = 0u8;
        if self.has_x() {
            flags |= WKB_BOX_HAS_X;
        }
        if self.has_z() {
            flags |= WKB_BOX_HAS_Z;
        }
        if self.is_geodetic() {
            flags |= WKB_BOX_GEODETIC;
        }
        if self.srid() != 0 {
            flags |= WKB_BOX_HAS_SRID;
        }
        if self.has_t() {
            flags |= WKB_BOX_HAS_T;
        }
        writer.write_u8(flags);
        if self.srid() != 0 {
            writer.write_u32(self.srid() as u32);
        }
        if self.has_x() {
            writer.write_f64(self.xmin().expect("x dimension present"));
            writer.write_f64(self.xmax().expect("x dimension present"));
            writer.write_f64(self.ymin().expect("x dimension present"));
            writer.write_f64(self.ymax().expect("x dimension present"));
            if self.has_z() {
                writer.write_f64(self.zmin().expect("z dimension present"));
                writer.write_f64(self.zmax().expect("z dimension present"));
            }
        }
        if let Some(period) = self.tstz_span() {
            write_span_body(&period.inner, &mut writer);
        }
        writer.into_bytes()
    }

    pub fn from_wkb(bytes: &[u8]) -> Result<Self> {
        let mut reader = WkbReader::new(bytes);
        reader.read_endian_flag()?;
        let code = reader.read_u16()?;
        if code != WKB_STBOX {
            return Err(Error::BadWkbType(code));
        }
        let flags = reader.read_u8()?;
        let srid = if flags & WKB_BOX_HAS_SRID != 0 {
            reader.read_u32()? as i32
        } else {
            0
        };
        let (mut x, mut y, mut z) = (None, None, None);
        if flags & WKB_BOX_HAS_X != 0 {
            let (xmin, xmax) = (reader.read_f64()?, reader.read_f64()?);
            let (ymin, ymax) = (reader.read_f64()?, reader.read_f64()?);
            x = Some(Span::new(xmin, xmax, true, true)?);
            y = Some(Span::new(ymin, ymax, true, true)?);
            if flags & WKB_BOX_HAS_Z != 0 {
                let (zmin, zmax) = (reader.read_f64()?, reader.read_f64()?);
                z = Some(Span::new(zmin, zmax, true, true)?);
            }
        }
        let period = if flags & WKB_BOX_HAS_T != 0 {
            Some(read_span_body::<i64>(&mut reader)?)
        } else {
            None
        };
        reader.expect_end()?;
        Ok(STBox::from_raw(
            x,
            y,
            z,
            srid,
            flags & WKB_BOX_GEODETIC != 0,
            period,
        ))
    }

    pub fn as_hexwkb(&self, variant: WKBVariant) -> String {
        encode_hex(&self.as_wkb(variant))
    }

    pub fn from_hexwkb(hex: &str) -> Result<Self> {
        Self::from_wkb(&decode_hex(hex)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collections::number::{FloatSpan, FloatSpanSet, IntSpan};
    use crate::temporal::{TBool, TFloat, TGeomPoint, TInt, TText};
    use pretty_assertions::assert_eq;

    fn round_trip<V>(text: &str)
    where
        V: BaseValue + WkbValue,
    {
        let value: Temporal<V> = text.parse().unwrap();
        for variant in [WKBVariant::NDR, WKBVariant::XDR] {
            let bytes = value.as_wkb(variant);
            assert_eq!(Temporal::<V>::from_wkb(&bytes).unwrap(), value);
            let hex = value.as_hexwkb(variant);
            assert_eq!(Temporal::<V>::from_hexwkb(&hex).unwrap(), value);
        }
    }

    #[test]
    fn temporal_round_trips_every_subtype() {
        round_trip::<bool>("t@2020-01-01");
        round_trip::<bool>("[t@2020-01-01, f@2020-01-02]");
        round_trip::<i32>("{1@2020-01-01, 2@2020-01-02}");
        round_trip::<i32>("{[1@2020-01-01, 2@2020-01-02), [5@2020-01-05]}");
        round_trip::<f64>("[1.5@2020-01-01, 2.5@2020-01-02)");
        round_trip::<String>("[\"aa\"@2020-01-01, \"bb\"@2020-01-02]");
        round_trip::<crate::base::Geom>("[POINT(1 1)@2000-01-01, POINT(2 2)@2000-01-02]");
        round_trip::<crate::base::Geog>("[POINT(4 4)@2000-01-01]");
        round_trip::<crate::base::NPoint>("[NPoint(1,0)@2020-01-01, NPoint(1,1)@2020-01-02]");
    }

    #[test]
    fn scenario_wkb_point_sequence_header() {
        let value: TGeomPoint = "[POINT(1 1)@2000-01-01]".parse().unwrap();
        let bytes = value.as_wkb(WKBVariant::NDR);
        assert_eq!(bytes[0], 0x01);
        let code = u16::from_le_bytes([bytes[1], bytes[2]]);
        assert_eq!(code, WKB_TGEOMPOINT);
        let flags = bytes[3];
        assert_eq!(flags & WKB_SUBTYPE_MASK, SUBTYPE_SEQUENCE);
        assert_eq!(TGeomPoint::from_wkb(&bytes).unwrap(), value);
    }

    #[test]
    fn srid_and_z_flags_survive() {
        let value: TGeomPoint =
            "[SRID=4326;POINT Z (1 1 5)@2000-01-01, SRID=4326;POINT Z (2 2 6)@2000-01-02]"
                .parse()
                .unwrap();
        let bytes = value.as_wkb(WKBVariant::NDR);
        assert_eq!(bytes[3] & WKB_HAS_Z, WKB_HAS_Z);
        assert_eq!(bytes[3] & WKB_HAS_SRID, WKB_HAS_SRID);
        assert_eq!(TGeomPoint::from_wkb(&bytes).unwrap(), value);
    }

    #[test]
    fn wrong_type_code_is_rejected() {
        let value: TInt = "1@2020-01-01".parse().unwrap();
        let bytes = value.as_wkb(WKBVariant::NDR);
        assert!(matches!(
            TFloat::from_wkb(&bytes),
            Err(Error::BadWkbType(WKB_TINT))
        ));
    }

    #[test]
    fn truncated_buffer_is_rejected() {
        let value: TBool = "[t@2020-01-01, f@2020-01-02]".parse().unwrap();
        let bytes = value.as_wkb(WKBVariant::NDR);
        assert!(matches!(
            TBool::from_wkb(&bytes[..bytes.len() - 1]),
            Err(Error::BufOverrun { .. })
        ));
        let mut extended = bytes.clone();
        extended.push(0);
        assert!(TBool::from_wkb(&extended).is_err());
    }

    #[test]
    fn span_and_span_set_round_trip() {
        let span: FloatSpan = "[23.9, 78.8)".parse().unwrap();
        for variant in [WKBVariant::NDR, WKBVariant::XDR] {
            assert_eq!(
                FloatSpan::from_wkb(&span.as_wkb(variant)).unwrap(),
                span
            );
        }
        let ispan = IntSpan::new(1, 5, true, true).unwrap();
        assert_eq!(IntSpan::from_wkb(&ispan.as_wkb(WKBVariant::NDR)).unwrap(), ispan);
        let set: FloatSpanSet = "{[1, 2), [5, 6)}".parse().unwrap();
        assert_eq!(
            FloatSpanSet::from_hexwkb(&set.as_hexwkb(WKBVariant::XDR)).unwrap(),
            set
        );
    }

    #[test]
    fn time_types_round_trip() {
        let span: TsTzSpan = "[2023-01-01, 2023-01-15)".parse().unwrap();
        assert_eq!(TsTzSpan::from_wkb(&span.as_wkb(WKBVariant::NDR)).unwrap(), span);
        let set: TsTzSpanSet = "{[2023-01-01, 2023-01-02), [2023-01-05, 2023-01-06)}"
            .parse()
            .unwrap();
        assert_eq!(
            TsTzSpanSet::from_wkb(&set.as_wkb(WKBVariant::XDR)).unwrap(),
            set
        );
    }

    #[test]
    fn boxes_round_trip() {
        let tbox: TBox = "TBOXFLOAT XT([3, 5],[2001-01-03, 2001-01-05])".parse().unwrap();
        assert_eq!(TBox::from_wkb(&tbox.as_wkb(WKBVariant::NDR)).unwrap(), tbox);
        let t_only: TBox = "TBOX T([2001-01-03, 2001-01-05])".parse().unwrap();
        assert_eq!(TBox::from_hexwkb(&t_only.as_hexwkb(WKBVariant::XDR)).unwrap(), t_only);

        let point: TGeomPoint = "[SRID=4326;POINT(1 2)@2000-01-01]".parse().unwrap();
        let stbox = crate::temporal::TPointTrait::bounding_stbox(&point);
        assert_eq!(STBox::from_wkb(&stbox.as_wkb(WKBVariant::NDR)).unwrap(), stbox);
    }

    #[test]
    fn text_value_has_length_prefix() {
        let value: TText = "\"hi\"@2020-01-01".parse().unwrap();
        let bytes = value.as_wkb(WKBVariant::NDR);
        // endian + code + flags, then the 8-byte length
        let len = i64::from_le_bytes(bytes[4..12].try_into().unwrap());
        assert_eq!(len, 2);
    }

    #[test]
    fn hex_is_uppercase_ascii() {
        let value: TInt = "1@2020-01-01".parse().unwrap();
        let hex = value.as_hexwkb(WKBVariant::NDR);
        assert!(hex.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(hex, hex.to_uppercase());
    }
}
