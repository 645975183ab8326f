//! The global `Date` object.
//!
//! A date carries a single `[[DateValue]]` epoch-millisecond timestamp
//! (`NaN` marks an invalid date). All calendar math is UTC, so the local
//! getters equal their UTC counterparts and `toString` renders
//! `GMT+0000 (UTC)`.

pub(super) mod utils;

#[cfg(test)]
mod tests;

use utils::{
    date_from_time, hour_from_time, make_date, make_day, make_time, min_from_time,
    month_from_time, ms_from_time, sec_from_time, time_clip, week_day, year_from_time,
    MONTH_NAMES, WEEKDAY_NAMES,
};

use crate::{
    builtins::{BuiltIn, BuiltInBuilder, BuiltInConstructor, BuiltInObject, IntrinsicObject},
    context::intrinsics::{Intrinsics, StandardConstructor, StandardConstructors},
    error::JsNativeError,
    js_string,
    object::{get_prototype_from_constructor, JsObject, ObjectData},
    property::Attribute,
    realm::Realm,
    string::JsString,
    symbol::JsSymbol,
    types::{Type, TypeContext},
    value::{IntegerOrNan, JsArgs, JsValue, PreferredType},
    Context, JsResult,
};

/// The internal representation of a date: its `[[DateValue]]` timestamp.
#[derive(Debug, Clone, Copy)]
pub struct Date {
    timestamp: f64,
}

impl Date {
    /// The timestamp, `NaN` when invalid.
    #[must_use]
    pub fn timestamp(self) -> f64 {
        self.timestamp
    }

    fn as_millis(self) -> Option<i64> {
        self.timestamp.is_finite().then_some(self.timestamp as i64)
    }
}

impl IntrinsicObject for Date {
    fn init(realm: &Realm) {
        let to_primitive = BuiltInBuilder::callable(realm, Self::to_primitive)
            .name("[Symbol.toPrimitive]")
            .length(1)
            .build();

        BuiltInBuilder::from_standard_constructor::<Self>(realm)
            .static_method(Self::now, "now", 0)
            .static_method(Self::parse, "parse", 1)
            .static_method(Self::utc, "UTC", 7)
            .method(Self::get_date, "getDate", 0)
            .method(Self::get_day, "getDay", 0)
            .method(Self::get_full_year, "getFullYear", 0)
            .method(Self::get_hours, "getHours", 0)
            .method(Self::get_milliseconds, "getMilliseconds", 0)
            .method(Self::get_minutes, "getMinutes", 0)
            .method(Self::get_month, "getMonth", 0)
            .method(Self::get_seconds, "getSeconds", 0)
            .method(Self::get_time, "getTime", 0)
            .method(Self::get_timezone_offset, "getTimezoneOffset", 0)
            .method(Self::get_date, "getUTCDate", 0)
            .method(Self::get_day, "getUTCDay", 0)
            .method(Self::get_full_year, "getUTCFullYear", 0)
            .method(Self::get_hours, "getUTCHours", 0)
            .method(Self::get_milliseconds, "getUTCMilliseconds", 0)
            .method(Self::get_minutes, "getUTCMinutes", 0)
            .method(Self::get_month, "getUTCMonth", 0)
            .method(Self::get_seconds, "getUTCSeconds", 0)
            .method(Self::set_date, "setDate", 1)
            .method(Self::set_full_year, "setFullYear", 3)
            .method(Self::set_hours, "setHours", 4)
            .method(Self::set_milliseconds, "setMilliseconds", 1)
            .method(Self::set_minutes, "setMinutes", 3)
            .method(Self::set_month, "setMonth", 2)
            .method(Self::set_seconds, "setSeconds", 2)
            .method(Self::set_time, "setTime", 1)
            .method(Self::set_date, "setUTCDate", 1)
            .method(Self::set_full_year, "setUTCFullYear", 3)
            .method(Self::set_hours, "setUTCHours", 4)
            .method(Self::set_milliseconds, "setUTCMilliseconds", 1)
            .method(Self::set_minutes, "setUTCMinutes", 3)
            .method(Self::set_month, "setUTCMonth", 2)
            .method(Self::set_seconds, "setUTCSeconds", 2)
            .method(Self::to_date_string, "toDateString", 0)
            .method(Self::to_iso_string, "toISOString", 0)
            .method(Self::to_json, "toJSON", 1)
            .method(Self::to_string, "toString", 0)
            .method(Self::to_time_string, "toTimeString", 0)
            .method(Self::to_utc_string, "toUTCString", 0)
            .method(Self::value_of, "valueOf", 0)
            .property(
                JsSymbol::to_primitive(),
                to_primitive,
                Attribute::READONLY | Attribute::NON_ENUMERABLE | Attribute::CONFIGURABLE,
            )
            .build();

        // The `clock()` global reports milliseconds since the epoch.
        BuiltInBuilder::callable_with_intrinsic::<ClockFunction>(realm, clock)
            .name("clock")
            .build();
        super::global_binding::<ClockFunction>(realm);
    }

    fn get(intrinsics: &Intrinsics) -> JsObject {
        Self::STANDARD_CONSTRUCTOR(intrinsics.constructors()).constructor()
    }
}

/// The global `clock` function object.
struct ClockFunction;

impl IntrinsicObject for ClockFunction {
    fn init(_realm: &Realm) {}

    fn get(intrinsics: &Intrinsics) -> JsObject {
        intrinsics.objects().clock()
    }
}

impl BuiltInObject for ClockFunction {
    const NAME: &'static str = "clock";
}

/// `clock ( )`
#[allow(clippy::unnecessary_wraps)]
fn clock(_: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
    Ok(JsValue::from(context.host_hooks().utc_now_ms() as f64))
}

impl BuiltInObject for Date {
    const NAME: &'static str = "Date";
}

impl BuiltInConstructor for Date {
    const LENGTH: usize = 7;

    const STANDARD_CONSTRUCTOR: fn(&StandardConstructors) -> &StandardConstructor =
        StandardConstructors::date;

    /// `Date ( ...values )`
    fn constructor(
        new_target: &JsValue,
        args: &[JsValue],
        context: &mut Context,
    ) -> JsResult<JsValue> {
        // An ordinary call renders the current time as a string.
        if new_target.is_undefined() {
            let now = Self {
                timestamp: context.host_hooks().utc_now_ms() as f64,
            };
            return Ok(now.to_display_string().into());
        }

        let timestamp = match args {
            [] => context.host_hooks().utc_now_ms() as f64,
            [value] => {
                if let Some(date) = value.as_object().and_then(|obj| obj.borrow().as_date().copied())
                {
                    date.timestamp
                } else {
                    let primitive = value.to_primitive(context, PreferredType::Default)?;
                    if let Some(string) = primitive.as_string() {
                        parse_date_string(string)
                    } else {
                        let number = primitive.to_number(context)?;
                        IntegerOrNan::from(number)
                            .as_integer()
                            .and_then(time_clip)
                            .map_or(f64::NAN, |t| t as f64)
                    }
                }
            }
            _ => Self::timestamp_from_fields(args, context)?,
        };

        let prototype =
            get_prototype_from_constructor(new_target, StandardConstructors::date, context)?;
        Ok(JsObject::from_proto_and_data(Some(prototype), ObjectData::Date(Self { timestamp }))
            .into())
    }
}

impl BuiltIn for Date {
    const PRIORITY: u32 = 180;

    fn init_types(types: &mut TypeContext<'_>) {
        types.define_global("Date", Type::named("DateConstructor"));
        types.define_global("clock", Type::function(vec![], Type::Number));
    }

    fn init_runtime(realm: &Realm) {
        <Self as IntrinsicObject>::init(realm);
        super::global_binding::<Self>(realm);
    }
}

fn this_date(this: &JsValue) -> JsResult<Date> {
    this.as_object()
        .and_then(|obj| obj.borrow().as_date().copied())
        .ok_or_else(|| {
            JsNativeError::typ()
                .with_message("'this' is not a Date")
                .into()
        })
}

fn set_this_timestamp(this: &JsValue, timestamp: f64) -> JsResult<JsValue> {
    let obj = this
        .as_object()
        .filter(|obj| obj.borrow().is_date())
        .cloned()
        .ok_or_else(|| JsNativeError::typ().with_message("'this' is not a Date"))?;
    if let Some(date) = obj.borrow_mut().as_date_mut() {
        date.timestamp = timestamp;
    }
    Ok(JsValue::from(timestamp))
}

/// Parses an ISO 8601 date string; unparsable input is `NaN`.
fn parse_date_string(string: &JsString) -> f64 {
    fn parse_impl(s: &str) -> Option<i64> {
        let s = s.trim();
        let (date_part, time_part) = match s.split_once('T') {
            Some((date, time)) => (date, Some(time)),
            None => (s, None),
        };

        let mut date_fields = date_part.splitn(3, '-');
        let year: i64 = date_fields.next()?.parse().ok()?;
        let month: i64 = date_fields.next().map_or(Ok(1), str::parse).ok()?;
        let date: i64 = date_fields.next().map_or(Ok(1), str::parse).ok()?;
        if !(1..=12).contains(&month) || !(1..=31).contains(&date) {
            return None;
        }

        let (mut hour, mut minute, mut second, mut millisecond) = (0i64, 0i64, 0i64, 0i64);
        let mut offset_minutes = 0i64;
        if let Some(time) = time_part {
            let time = if let Some(rest) = time.strip_suffix('Z') {
                rest
            } else if let Some((rest, offset)) = time.rsplit_once('+') {
                offset_minutes = -parse_offset(offset)?;
                rest
            } else if let Some((rest, offset)) = time
                .rsplit_once('-')
                .filter(|(rest, _)| rest.contains(':'))
            {
                offset_minutes = parse_offset(offset)?;
                rest
            } else {
                time
            };

            let (clock, millis) = match time.split_once('.') {
                Some((clock, millis)) => (clock, Some(millis)),
                None => (time, None),
            };
            let mut clock_fields = clock.splitn(3, ':');
            hour = clock_fields.next()?.parse().ok()?;
            minute = clock_fields.next().map_or(Ok(0), str::parse).ok()?;
            second = clock_fields.next().map_or(Ok(0), str::parse).ok()?;
            if let Some(millis) = millis {
                let millis = &millis[..millis.len().min(3)];
                millisecond = millis.parse().ok()?;
            }
            if hour > 23 || minute > 59 || second > 59 {
                return None;
            }
        }

        let day = make_day(year, month - 1, date)?;
        let time = make_time(hour, minute, second, millisecond)?;
        let ts = make_date(day, time)?;
        time_clip(ts.checked_add(offset_minutes.checked_mul(60_000)?)?)
    }

    fn parse_offset(offset: &str) -> Option<i64> {
        let (hours, minutes) = offset.split_once(':')?;
        let hours: i64 = hours.parse().ok()?;
        let minutes: i64 = minutes.parse().ok()?;
        Some(hours * 60 + minutes)
    }

    parse_impl(string.as_str()).map_or(f64::NAN, |t| t as f64)
}

impl Date {
    fn timestamp_from_fields(args: &[JsValue], context: &mut Context) -> JsResult<f64> {
        let mut fields = [0i64; 7];
        let defaults = [0, 0, 1, 0, 0, 0, 0];
        for (i, default) in defaults.iter().enumerate() {
            fields[i] = match args.get(i) {
                Some(value) => {
                    let number = value.to_number(context)?;
                    match IntegerOrNan::from(number).as_integer() {
                        Some(int) => int,
                        None => return Ok(f64::NAN),
                    }
                }
                None => *default,
            };
        }
        // Two-digit years land in the 20th century.
        if (0..=99).contains(&fields[0]) {
            fields[0] += 1900;
        }

        let timestamp = make_day(fields[0], fields[1], fields[2])
            .and_then(|day| {
                make_time(fields[3], fields[4], fields[5], fields[6])
                    .and_then(|time| make_date(day, time))
            })
            .and_then(time_clip);
        Ok(timestamp.map_or(f64::NAN, |t| t as f64))
    }

    fn to_display_string(self) -> JsString {
        match self.as_millis() {
            None => js_string!("Invalid Date"),
            Some(t) => JsString::from(format!(
                "{} {} {:02} {} {:02}:{:02}:{:02} GMT+0000 (UTC)",
                WEEKDAY_NAMES[week_day(t) as usize],
                MONTH_NAMES[month_from_time(t) as usize],
                date_from_time(t),
                year_from_time(t),
                hour_from_time(t),
                min_from_time(t),
                sec_from_time(t),
            )),
        }
    }

    /// `Date.now ( )`
    #[allow(clippy::unnecessary_wraps)]
    fn now(_: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::from(context.host_hooks().utc_now_ms() as f64))
    }

    /// `Date.parse ( string )`
    fn parse(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let string = args.get_or_undefined(0).to_string(context)?;
        Ok(JsValue::from(parse_date_string(&string)))
    }

    /// `Date.UTC ( year [ , month [ , ... ] ] )`
    fn utc(_: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::from(Self::timestamp_from_fields(args, context)?))
    }

    /// `Date.prototype.getTime ( )` and `Date.prototype.valueOf ( )`
    fn get_time(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::from(this_date(this)?.timestamp))
    }

    fn value_of(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(JsValue::from(this_date(this)?.timestamp))
    }

    /// `Date.prototype.getTimezoneOffset ( )`: always zero in the UTC-only
    /// core.
    fn get_timezone_offset(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let date = this_date(this)?;
        if date.timestamp.is_nan() {
            return Ok(JsValue::nan());
        }
        Ok(JsValue::from(0))
    }

    /// `Date.prototype.setTime ( time )`
    fn set_time(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        this_date(this)?;
        let number = args.get_or_undefined(0).to_number(context)?;
        let timestamp = IntegerOrNan::from(number)
            .as_integer()
            .and_then(time_clip)
            .map_or(f64::NAN, |t| t as f64);
        set_this_timestamp(this, timestamp)
    }

    /// Rebuilds the timestamp with some calendar fields replaced.
    fn set_fields(
        this: &JsValue,
        args: &[JsValue],
        first_field: usize,
        count: usize,
        context: &mut Context,
    ) -> JsResult<JsValue> {
        let date = this_date(this)?;

        // Setting the year revives an invalid date from the epoch; every
        // other setter keeps it invalid.
        let base = match date.as_millis() {
            Some(t) => t,
            None if first_field == 0 => 0,
            None => return set_this_timestamp(this, f64::NAN),
        };

        let mut fields = [
            year_from_time(base),
            month_from_time(base),
            date_from_time(base),
            hour_from_time(base),
            min_from_time(base),
            sec_from_time(base),
            ms_from_time(base),
        ];

        for i in 0..count {
            if let Some(value) = args.get(i) {
                let number = value.to_number(context)?;
                match IntegerOrNan::from(number).as_integer() {
                    Some(int) => fields[first_field + i] = int,
                    None => return set_this_timestamp(this, f64::NAN),
                }
            }
        }

        let timestamp = make_day(fields[0], fields[1], fields[2])
            .and_then(|day| {
                make_time(fields[3], fields[4], fields[5], fields[6])
                    .and_then(|time| make_date(day, time))
            })
            .and_then(time_clip)
            .map_or(f64::NAN, |t| t as f64);
        set_this_timestamp(this, timestamp)
    }

    /// `Date.prototype.setFullYear ( year [ , month [ , date ] ] )`
    fn set_full_year(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::set_fields(this, args, 0, 3, context)
    }

    /// `Date.prototype.setMonth ( month [ , date ] )`
    fn set_month(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::set_fields(this, args, 1, 2, context)
    }

    /// `Date.prototype.setDate ( date )`
    fn set_date(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::set_fields(this, args, 2, 1, context)
    }

    /// `Date.prototype.setHours ( hour [ , min [ , sec [ , ms ] ] ] )`
    fn set_hours(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::set_fields(this, args, 3, 4, context)
    }

    /// `Date.prototype.setMinutes ( min [ , sec [ , ms ] ] )`
    fn set_minutes(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::set_fields(this, args, 4, 3, context)
    }

    /// `Date.prototype.setSeconds ( sec [ , ms ] )`
    fn set_seconds(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::set_fields(this, args, 5, 2, context)
    }

    /// `Date.prototype.setMilliseconds ( ms )`
    fn set_milliseconds(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        Self::set_fields(this, args, 6, 1, context)
    }

    /// `Date.prototype.toISOString ( )`
    ///
    /// `YYYY-MM-DDTHH:MM:SS.sssZ`; an invalid date raises `RangeError`.
    #[allow(clippy::wrong_self_convention)]
    fn to_iso_string(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let date = this_date(this)?;
        let Some(t) = date.as_millis() else {
            return Err(JsNativeError::range()
                .with_message("Invalid time value")
                .into());
        };
        Ok(JsString::from(format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:03}Z",
            year_from_time(t),
            month_from_time(t) + 1,
            date_from_time(t),
            hour_from_time(t),
            min_from_time(t),
            sec_from_time(t),
            ms_from_time(t),
        ))
        .into())
    }

    /// `Date.prototype.toJSON ( key )`
    fn to_json(this: &JsValue, _: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let date = this_date(this)?;
        if date.timestamp.is_nan() {
            return Ok(JsValue::null());
        }
        Self::to_iso_string(this, &[], context)
    }

    /// `Date.prototype.toString ( )`
    #[allow(clippy::wrong_self_convention)]
    fn to_string(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        Ok(this_date(this)?.to_display_string().into())
    }

    /// `Date.prototype.toDateString ( )`
    #[allow(clippy::wrong_self_convention)]
    fn to_date_string(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let date = this_date(this)?;
        match date.as_millis() {
            None => Ok(js_string!("Invalid Date").into()),
            Some(t) => Ok(JsString::from(format!(
                "{} {} {:02} {}",
                WEEKDAY_NAMES[week_day(t) as usize],
                MONTH_NAMES[month_from_time(t) as usize],
                date_from_time(t),
                year_from_time(t),
            ))
            .into()),
        }
    }

    /// `Date.prototype.toTimeString ( )`
    #[allow(clippy::wrong_self_convention)]
    fn to_time_string(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let date = this_date(this)?;
        match date.as_millis() {
            None => Ok(js_string!("Invalid Date").into()),
            Some(t) => Ok(JsString::from(format!(
                "{:02}:{:02}:{:02} GMT+0000 (UTC)",
                hour_from_time(t),
                min_from_time(t),
                sec_from_time(t),
            ))
            .into()),
        }
    }

    /// `Date.prototype.toUTCString ( )`
    #[allow(clippy::wrong_self_convention)]
    fn to_utc_string(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
        let date = this_date(this)?;
        match date.as_millis() {
            None => Ok(js_string!("Invalid Date").into()),
            Some(t) => Ok(JsString::from(format!(
                "{}, {:02} {} {} {:02}:{:02}:{:02} GMT",
                WEEKDAY_NAMES[week_day(t) as usize],
                date_from_time(t),
                MONTH_NAMES[month_from_time(t) as usize],
                year_from_time(t),
                hour_from_time(t),
                min_from_time(t),
                sec_from_time(t),
            ))
            .into()),
        }
    }

    /// `Date.prototype [ @@toPrimitive ] ( hint )`
    fn to_primitive(this: &JsValue, args: &[JsValue], context: &mut Context) -> JsResult<JsValue> {
        let hint = args.get_or_undefined(0);
        let hint = hint.as_string().map(JsString::to_std_string);
        match hint.as_deref() {
            // The default hint for dates is string.
            Some("string" | "default") => Self::to_string(this, &[], context),
            Some("number") => Self::value_of(this, &[], context),
            _ => Err(JsNativeError::typ()
                .with_message("invalid hint passed to Date[@@toPrimitive]")
                .into()),
        }
    }
}

macro_rules! date_getters {
    ($( $(#[$attr:meta])* $name:ident => $getter:expr );* $(;)?) => {
        impl Date {
            $(
                $(#[$attr])*
                fn $name(this: &JsValue, _: &[JsValue], _: &mut Context) -> JsResult<JsValue> {
                    let date = this_date(this)?;
                    match date.as_millis() {
                        None => Ok(JsValue::nan()),
                        #[allow(clippy::redundant_closure_call)]
                        Some(t) => Ok(JsValue::from(($getter)(t) as f64)),
                    }
                }
            )*
        }
    };
}

date_getters! {
    /// `Date.prototype.getFullYear ( )`
    get_full_year => year_from_time;
    /// `Date.prototype.getMonth ( )`
    get_month => month_from_time;
    /// `Date.prototype.getDate ( )`
    get_date => date_from_time;
    /// `Date.prototype.getDay ( )`
    get_day => week_day;
    /// `Date.prototype.getHours ( )`
    get_hours => hour_from_time;
    /// `Date.prototype.getMinutes ( )`
    get_minutes => min_from_time;
    /// `Date.prototype.getSeconds ( )`
    get_seconds => sec_from_time;
    /// `Date.prototype.getMilliseconds ( )`
    get_milliseconds => ms_from_time;
}
