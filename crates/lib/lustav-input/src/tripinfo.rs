use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use indexmap::IndexMap;
use log::debug;
use quick_xml::events::Event;
use quick_xml::Reader;
use typed_builder::TypedBuilder;

use crate::error::{InputError, InputResult};
use crate::xml::Attributes;

/// One finished trip from SUMO's `--tripinfo-output`.
#[derive(Clone, Debug, Default, PartialEq, TypedBuilder)]
pub struct TripRecord {
    #[builder(setter(into))]
    pub id: String,
    #[builder(default, setter(into))]
    pub v_type: String,
    #[builder(default)]
    pub depart: f64,
    #[builder(default)]
    pub arrival: f64,
    #[builder(default)]
    pub duration: f64,
    #[builder(default)]
    pub route_length: f64,
    #[builder(default)]
    pub waiting_time: f64,
    #[builder(default)]
    pub waiting_count: u32,
    #[builder(default)]
    pub time_loss: f64,
    /// Absolute fuel use in mg, present only with the emissions device.
    #[builder(default)]
    pub fuel: Option<f64>,
}

/// Streams `<tripinfo>` elements out of a tripinfo file.
pub struct TripInfoReader<R: BufRead> {
    reader: Reader<R>,
}

impl TripInfoReader<BufReader<File>> {
    pub fn from_file(path: &Path) -> InputResult<Self> {
        let file = File::open(path).map_err(|source| InputError::Open {
            path: path.display().to_string(),
            source,
        })?;
        Ok(Self::from_reader(BufReader::new(file)))
    }
}

impl<R: BufRead> TripInfoReader<R> {
    pub fn from_reader(input: R) -> Self {
        let mut reader = Reader::from_reader(input);
        reader.config_mut().trim_text(true);
        Self { reader }
    }

    pub fn read_all(mut self) -> InputResult<Vec<TripRecord>> {
        let mut trips = Vec::new();
        let mut buffer = Vec::new();
        let mut open_trip: Option<TripRecord> = None;
        loop {
            let event = self
                .reader
                .read_event_into(&mut buffer)
                .map_err(|source| InputError::Xml {
                    position: self.reader.error_position(),
                    source,
                })?;
            match event {
                Event::Start(tag) if tag.name().as_ref() == b"tripinfo" => {
                    open_trip = Some(Self::trip_from(&Attributes::of(&tag)?)?);
                }
                Event::Empty(tag) if tag.name().as_ref() == b"tripinfo" => {
                    trips.push(Self::trip_from(&Attributes::of(&tag)?)?);
                }
                Event::Empty(tag) if tag.name().as_ref() == b"emissions" => {
                    if let Some(trip) = open_trip.as_mut() {
                        trip.fuel = Attributes::of(&tag)?.number("fuel_abs")?;
                    }
                }
                Event::End(tag) if tag.name().as_ref() == b"tripinfo" => {
                    if let Some(trip) = open_trip.take() {
                        trips.push(trip);
                    }
                }
                Event::Eof => break,
                _ => {}
            }
            buffer.clear();
        }
        debug!("Read {} trips", trips.len());
        Ok(trips)
    }

    fn trip_from(attributes: &Attributes) -> InputResult<TripRecord> {
        let waiting_count = attributes.number_or_zero("waitingCount")?;
        Ok(TripRecord::builder()
            .id(attributes.required_text("id")?)
            .v_type(attributes.text("vType").unwrap_or_default())
            .depart(attributes.number_or_zero("depart")?)
            .arrival(attributes.number_or_zero("arrival")?)
            .duration(attributes.number_or_zero("duration")?)
            .route_length(attributes.number_or_zero("routeLength")?)
            .waiting_time(attributes.number_or_zero("waitingTime")?)
            .waiting_count(waiting_count.max(0.0) as u32)
            .time_loss(attributes.number_or_zero("timeLoss")?)
            .build())
    }
}

/// Aggregate view over a set of trips.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct TripSummary {
    pub trips: usize,
    pub mean_duration: f64,
    pub mean_time_loss: f64,
    pub mean_stops: f64,
    pub total_fuel: f64,
}

impl TripSummary {
    pub fn of<'a>(trips: impl IntoIterator<Item = &'a TripRecord>) -> Self {
        let mut summary = TripSummary::default();
        let mut duration = 0.0;
        let mut time_loss = 0.0;
        let mut stops = 0.0;
        for trip in trips {
            summary.trips += 1;
            duration += trip.duration;
            time_loss += trip.time_loss;
            stops += trip.waiting_count as f64;
            summary.total_fuel += trip.fuel.unwrap_or(0.0);
        }
        if summary.trips > 0 {
            let count = summary.trips as f64;
            summary.mean_duration = duration / count;
            summary.mean_time_loss = time_loss / count;
            summary.mean_stops = stops / count;
        }
        summary
    }

    /// Summaries per vehicle type, in order of first appearance.
    pub fn by_type(trips: &[TripRecord]) -> IndexMap<String, TripSummary> {
        let mut grouped: IndexMap<String, Vec<&TripRecord>> = IndexMap::new();
        for trip in trips {
            grouped.entry(trip.v_type.clone()).or_default().push(trip);
        }
        grouped
            .into_iter()
            .map(|(v_type, group)| (v_type, TripSummary::of(group)))
            .collect()
    }
}
