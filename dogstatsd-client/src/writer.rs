const MAX_EXACT_INT_F64: f64 = 9_007_199_254_740_992.0; // 2^53

#[derive(Clone, Copy)]
pub(crate) enum MetricType {
    Gauge,
    Count,
    Histogram,
    Timer,
    Set,
}

impl MetricType {
    fn as_bytes(self) -> &'static [u8] {
        match self {
            MetricType::Gauge => b"|g",
            MetricType::Count => b"|c",
            MetricType::Histogram => b"|h",
            MetricType::Timer => b"|ms",
            MetricType::Set => b"|s",
        }
    }
}

#[derive(Clone, Copy)]
pub(crate) enum MetricValue<'a> {
    Integer(i64),
    FloatingPoint(f64),
    Raw(&'a str),
}

struct MetricValueFormatter {
    int_writer: itoa::Buffer,
    float_writer: ryu::Buffer,
}

impl MetricValueFormatter {
    fn new() -> Self {
        Self { int_writer: itoa::Buffer::new(), float_writer: ryu::Buffer::new() }
    }

    fn format<'a>(&'a mut self, value: MetricValue<'a>) -> &'a str {
        match value {
            MetricValue::Integer(v) => self.int_writer.format(v),
            MetricValue::FloatingPoint(v) => self.format_float(v),
            MetricValue::Raw(v) => v,
        }
    }

    // Shortest round-trip form, with no trailing zeros: integral values go out as
    // plain integers (`1`, not `1.0`), everything else as ryu prints it.
    #[allow(clippy::float_cmp)]
    fn format_float(&mut self, value: f64) -> &str {
        if value.is_finite() && value.fract() == 0.0 && value.abs() <= MAX_EXACT_INT_F64 {
            self.int_writer.format(value as i64)
        } else {
            self.float_writer.format(value)
        }
    }
}

/// Builds a single DogStatsD payload.
///
/// Metric payloads follow `<namespace><name>:<value>|<type>[|@<rate>][|#<tag>,...]`, and event
/// payloads follow `_e{<title len>,<text len>}:<title>|<text>[|#<tag>,...]`. Names, values, and
/// tags are written verbatim -- the protocol has no escaping, and the writer performs no
/// validation. Each payload is sent as one datagram, so there is no delimiter between payloads
/// and no length accounting here.
pub(crate) struct PayloadWriter {
    buf: Vec<u8>,
    formatter: MetricValueFormatter,
}

impl PayloadWriter {
    pub fn new() -> Self {
        Self { buf: Vec::new(), formatter: MetricValueFormatter::new() }
    }

    /// Writes a metric payload.
    ///
    /// The namespace is concatenated directly in front of the name, with no inserted delimiter.
    /// `sample_rate` must only be set on the sampled-in branch of a rate < 1 call; the caller
    /// owns the sampling decision.
    pub fn write_metric(
        &mut self,
        namespace: &str,
        name: &str,
        value: MetricValue<'_>,
        metric_type: MetricType,
        sample_rate: Option<f64>,
        global_tags: &[String],
        tags: &[&str],
    ) {
        self.buf.clear();

        self.buf.extend_from_slice(namespace.as_bytes());
        self.buf.extend_from_slice(name.as_bytes());
        self.buf.push(b':');

        let value_str = self.formatter.format(value);
        self.buf.extend_from_slice(value_str.as_bytes());

        self.buf.extend_from_slice(metric_type.as_bytes());

        if let Some(rate) = sample_rate {
            let rate_str = self.formatter.format_float(rate);
            self.buf.extend_from_slice(b"|@");
            self.buf.extend_from_slice(rate_str.as_bytes());
        }

        self.write_tags(global_tags, tags);
    }

    /// Writes an event payload.
    ///
    /// The framed lengths are byte counts of the raw title and text as written.
    pub fn write_event(&mut self, title: &str, text: &str, global_tags: &[String], tags: &[&str]) {
        self.buf.clear();

        let mut len_writer = itoa::Buffer::new();
        self.buf.extend_from_slice(b"_e{");
        self.buf.extend_from_slice(len_writer.format(title.len()).as_bytes());
        self.buf.push(b',');
        self.buf.extend_from_slice(len_writer.format(text.len()).as_bytes());
        self.buf.extend_from_slice(b"}:");
        self.buf.extend_from_slice(title.as_bytes());
        self.buf.push(b'|');
        self.buf.extend_from_slice(text.as_bytes());

        self.write_tags(global_tags, tags);
    }

    fn write_tags(&mut self, global_tags: &[String], tags: &[&str]) {
        // Global tags always come first, in their configured order, followed by the
        // call-specific tags in caller order. No de-duplication.
        let mut wrote_tag = false;
        for tag in global_tags.iter().map(String::as_str).chain(tags.iter().copied()) {
            // If we haven't written a tag yet, write out the tags prefix first.
            //
            // Otherwise, write a tag separator.
            if wrote_tag {
                self.buf.push(b',');
            } else {
                self.buf.extend_from_slice(b"|#");
                wrote_tag = true;
            }

            self.buf.extend_from_slice(tag.as_bytes());
        }
    }

    pub fn payload(&self) -> &[u8] {
        &self.buf
    }
}

#[cfg(test)]
mod tests {
    use proptest::{collection::vec as arb_vec, prelude::*};

    use super::{MetricType, MetricValue, PayloadWriter};

    fn string_from_writer(writer: &PayloadWriter) -> String {
        String::from_utf8(writer.payload().to_vec()).unwrap()
    }

    fn write_metric(
        namespace: &str,
        name: &str,
        value: MetricValue<'_>,
        metric_type: MetricType,
        sample_rate: Option<f64>,
        global_tags: &[&str],
        tags: &[&str],
    ) -> String {
        let global_tags = global_tags.iter().map(ToString::to_string).collect::<Vec<_>>();

        let mut writer = PayloadWriter::new();
        writer.write_metric(namespace, name, value, metric_type, sample_rate, &global_tags, tags);
        string_from_writer(&writer)
    }

    #[test]
    fn gauge() {
        // Cases are defined as: sample rate, call tags, expected output.
        let cases = [
            (None, &[][..], "test.gauge:1|g"),
            (Some(0.999999), &[], "test.gauge:1|g|@0.999999"),
            (None, &["tagA"], "test.gauge:1|g|#tagA"),
            (None, &["tagA", "tagB"], "test.gauge:1|g|#tagA,tagB"),
            (Some(0.999999), &["tagA"], "test.gauge:1|g|@0.999999|#tagA"),
        ];

        for (sample_rate, tags, expected) in cases {
            let actual = write_metric(
                "",
                "test.gauge",
                MetricValue::FloatingPoint(1.0),
                MetricType::Gauge,
                sample_rate,
                &[],
                tags,
            );
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn count() {
        let cases = [(1, "test.count:1|c|#tagA"), (-1, "test.count:-1|c|#tagA")];

        for (value, expected) in cases {
            let actual = write_metric(
                "",
                "test.count",
                MetricValue::Integer(value),
                MetricType::Count,
                None,
                &[],
                &["tagA"],
            );
            assert_eq!(actual, expected);
        }
    }

    #[test]
    fn histogram() {
        let actual = write_metric(
            "",
            "test.histogram",
            MetricValue::FloatingPoint(2.3),
            MetricType::Histogram,
            None,
            &[],
            &["tagA"],
        );
        assert_eq!(actual, "test.histogram:2.3|h|#tagA");
    }

    #[test]
    fn timer() {
        let actual = write_metric(
            "",
            "test.timer",
            MetricValue::FloatingPoint(44.876),
            MetricType::Timer,
            None,
            &[],
            &["tagA"],
        );
        assert_eq!(actual, "test.timer:44.876|ms|#tagA");
    }

    #[test]
    fn set() {
        let actual = write_metric(
            "",
            "test.set",
            MetricValue::Raw("uuid"),
            MetricType::Set,
            None,
            &[],
            &["tagA"],
        );
        assert_eq!(actual, "test.set:uuid|s|#tagA");
    }

    #[test]
    fn namespace_is_prepended_verbatim() {
        // No delimiter is inserted between the namespace and the name.
        let actual = write_metric(
            "flubber.",
            "test.set",
            MetricValue::Raw("uuid"),
            MetricType::Set,
            None,
            &[],
            &["tagA"],
        );
        assert_eq!(actual, "flubber.test.set:uuid|s|#tagA");
    }

    #[test]
    fn global_tags_come_first() {
        let actual = write_metric(
            "",
            "test.set",
            MetricValue::Raw("uuid"),
            MetricType::Set,
            None,
            &["tagC"],
            &["tagA"],
        );
        assert_eq!(actual, "test.set:uuid|s|#tagC,tagA");
    }

    #[test]
    fn float_values_use_shortest_form() {
        let cases = [
            (1.0, "1"),
            (-1.0, "-1"),
            (0.5, "0.5"),
            (2.3, "2.3"),
            (44.876, "44.876"),
            (0.999999, "0.999999"),
            (1e16, "1e16"),
        ];

        for (value, expected) in cases {
            let actual = write_metric(
                "",
                "metric",
                MetricValue::FloatingPoint(value),
                MetricType::Gauge,
                None,
                &[],
                &[],
            );
            assert_eq!(actual, format!("metric:{expected}|g"));
        }
    }

    #[test]
    fn event() {
        // Cases are defined as: title, text, global tags, call tags, expected output.
        let cases = [
            ("title", "text", &[][..], &[][..], "_e{5,4}:title|text"),
            ("title", "text", &[], &["tag1", "tag2"], "_e{5,4}:title|text|#tag1,tag2"),
            ("title", "text", &["tagC"], &["tagA"], "_e{5,4}:title|text|#tagC,tagA"),
            ("", "", &[], &[], "_e{0,0}:|"),
        ];

        for (title, text, global_tags, tags, expected) in cases {
            let global_tags = global_tags.iter().map(ToString::to_string).collect::<Vec<_>>();

            let mut writer = PayloadWriter::new();
            writer.write_event(title, text, &global_tags, tags);
            assert_eq!(string_from_writer(&writer), expected);
        }
    }

    #[test]
    fn event_lengths_are_byte_counts() {
        let mut writer = PayloadWriter::new();
        writer.write_event("héllo", "wörld", &[], &[]);
        assert_eq!(string_from_writer(&writer), "_e{6,6}:héllo|wörld");
    }

    proptest! {
        #[test]
        fn metric_payload_structure(
            name in "[a-z][a-z0-9_.]{3,24}",
            value in prop::num::f64::NORMAL,
            tags in arb_vec("[a-z][a-z0-9:]{1,12}", 0..4),
        ) {
            let tag_refs = tags.iter().map(String::as_str).collect::<Vec<_>>();

            let mut writer = PayloadWriter::new();
            writer.write_metric(
                "",
                &name,
                MetricValue::FloatingPoint(value),
                MetricType::Gauge,
                None,
                &[],
                &tag_refs,
            );

            let payload = std::str::from_utf8(writer.payload()).unwrap().to_string();
            let body = payload.strip_prefix(&format!("{name}:")).unwrap();
            let (value_str, trailer) = body.split_once('|').unwrap();

            // The formatted value must round-trip back to the input exactly.
            prop_assert_eq!(value_str.parse::<f64>().unwrap(), value);

            if tags.is_empty() {
                prop_assert_eq!(trailer, "g");
            } else {
                prop_assert_eq!(trailer, format!("g|#{}", tags.join(",")));
            }
        }
    }
}
