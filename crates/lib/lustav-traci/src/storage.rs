use crate::constants::{
    TYPE_BYTE, TYPE_COMPOUND, TYPE_DOUBLE, TYPE_INTEGER, TYPE_STRING, TYPE_STRINGLIST, TYPE_UBYTE,
};
use crate::error::{TraciError, TraciResult};

/// Largest command that still fits the single byte length header.
const SHORT_COMMAND_LIMIT: usize = 255;

/// Growable big-endian buffer that TraCI commands are serialised into.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct Storage {
    buffer: Vec<u8>,
}

impl Storage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.buffer
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }

    pub fn len(&self) -> usize {
        self.buffer.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buffer.is_empty()
    }

    pub fn write_u8(&mut self, value: u8) {
        self.buffer.push(value);
    }

    pub fn write_i8(&mut self, value: i8) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_i32(&mut self, value: i32) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_f64(&mut self, value: f64) {
        self.buffer.extend_from_slice(&value.to_be_bytes());
    }

    pub fn write_string(&mut self, value: &str) {
        self.write_i32(value.len() as i32);
        self.buffer.extend_from_slice(value.as_bytes());
    }

    pub fn write_string_list(&mut self, values: &[String]) {
        self.write_i32(values.len() as i32);
        for value in values {
            self.write_string(value);
        }
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) {
        self.buffer.extend_from_slice(bytes);
    }

    pub fn write_typed_ubyte(&mut self, value: u8) {
        self.write_u8(TYPE_UBYTE);
        self.write_u8(value);
    }

    pub fn write_typed_i32(&mut self, value: i32) {
        self.write_u8(TYPE_INTEGER);
        self.write_i32(value);
    }

    pub fn write_typed_f64(&mut self, value: f64) {
        self.write_u8(TYPE_DOUBLE);
        self.write_f64(value);
    }

    pub fn write_typed_string(&mut self, value: &str) {
        self.write_u8(TYPE_STRING);
        self.write_string(value);
    }

    pub fn write_typed_string_list(&mut self, values: &[String]) {
        self.write_u8(TYPE_STRINGLIST);
        self.write_string_list(values);
    }

    /// Appends a command, choosing the extended length header when the command is too long
    /// for a single byte.
    pub fn write_command(&mut self, command_id: u8, content: &[u8]) {
        let length = 1 + 1 + content.len();
        if length <= SHORT_COMMAND_LIMIT {
            self.write_u8(length as u8);
        } else {
            self.write_u8(0);
            self.write_i32((length + 4) as i32);
        }
        self.write_u8(command_id);
        self.write_bytes(content);
    }

    /// Wraps the buffer into a message by prefixing the total length.
    pub fn into_message(self) -> Vec<u8> {
        let total = (self.buffer.len() + 4) as i32;
        let mut message = Vec::with_capacity(self.buffer.len() + 4);
        message.extend_from_slice(&total.to_be_bytes());
        message.extend_from_slice(&self.buffer);
        message
    }
}

/// A value carried by a TraCI response, tagged by its type byte.
#[derive(Debug, Clone, PartialEq)]
pub enum TraciValue {
    UByte(u8),
    Byte(i8),
    Integer(i32),
    Double(f64),
    Text(String),
    TextList(Vec<String>),
    Compound(Vec<TraciValue>),
}

impl TraciValue {
    pub fn type_name(&self) -> &'static str {
        match self {
            TraciValue::UByte(_) => "ubyte",
            TraciValue::Byte(_) => "byte",
            TraciValue::Integer(_) => "integer",
            TraciValue::Double(_) => "double",
            TraciValue::Text(_) => "string",
            TraciValue::TextList(_) => "string list",
            TraciValue::Compound(_) => "compound",
        }
    }

    pub fn into_f64(self) -> TraciResult<f64> {
        match self {
            TraciValue::Double(value) => Ok(value),
            other => Err(Self::mismatch("double", &other)),
        }
    }

    pub fn into_i32(self) -> TraciResult<i32> {
        match self {
            TraciValue::Integer(value) => Ok(value),
            other => Err(Self::mismatch("integer", &other)),
        }
    }

    pub fn into_u8(self) -> TraciResult<u8> {
        match self {
            TraciValue::UByte(value) => Ok(value),
            TraciValue::Integer(value) if (0..=255).contains(&value) => Ok(value as u8),
            other => Err(Self::mismatch("ubyte", &other)),
        }
    }

    pub fn into_string(self) -> TraciResult<String> {
        match self {
            TraciValue::Text(value) => Ok(value),
            other => Err(Self::mismatch("string", &other)),
        }
    }

    pub fn into_string_list(self) -> TraciResult<Vec<String>> {
        match self {
            TraciValue::TextList(values) => Ok(values),
            other => Err(Self::mismatch("string list", &other)),
        }
    }

    fn mismatch(expected: &str, found: &TraciValue) -> TraciError {
        TraciError::protocol(format!(
            "expected a {} value, found {}",
            expected,
            found.type_name()
        ))
    }
}

/// Cursor over a received message body.
#[derive(Debug)]
pub struct StorageReader<'a> {
    data: &'a [u8],
    position: usize,
}

impl<'a> StorageReader<'a> {
    pub fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    pub fn position(&self) -> usize {
        self.position
    }

    pub fn remaining(&self) -> usize {
        self.data.len() - self.position
    }

    pub fn has_remaining(&self) -> bool {
        self.remaining() > 0
    }

    fn take(&mut self, count: usize) -> TraciResult<&'a [u8]> {
        if self.remaining() < count {
            return Err(TraciError::protocol(format!(
                "needed {} bytes at offset {} but only {} remain",
                count,
                self.position,
                self.remaining()
            )));
        }
        let slice = &self.data[self.position..self.position + count];
        self.position += count;
        Ok(slice)
    }

    fn take_array<const N: usize>(&mut self) -> TraciResult<[u8; N]> {
        let mut array = [0u8; N];
        array.copy_from_slice(self.take(N)?);
        Ok(array)
    }

    pub fn skip(&mut self, count: usize) -> TraciResult<()> {
        self.take(count).map(|_| ())
    }

    pub fn read_u8(&mut self) -> TraciResult<u8> {
        Ok(self.take(1)?[0])
    }

    pub fn read_i8(&mut self) -> TraciResult<i8> {
        Ok(i8::from_be_bytes(self.take_array()?))
    }

    pub fn read_i32(&mut self) -> TraciResult<i32> {
        Ok(i32::from_be_bytes(self.take_array()?))
    }

    pub fn read_f64(&mut self) -> TraciResult<f64> {
        Ok(f64::from_be_bytes(self.take_array()?))
    }

    fn read_length(&mut self) -> TraciResult<usize> {
        let length = self.read_i32()?;
        usize::try_from(length)
            .map_err(|_| TraciError::protocol(format!("negative length {}", length)))
    }

    pub fn read_string(&mut self) -> TraciResult<String> {
        let length = self.read_length()?;
        let bytes = self.take(length)?;
        String::from_utf8(bytes.to_vec())
            .map_err(|e| TraciError::protocol(format!("string is not valid UTF-8: {}", e)))
    }

    pub fn read_string_list(&mut self) -> TraciResult<Vec<String>> {
        let count = self.read_length()?;
        (0..count).map(|_| self.read_string()).collect()
    }

    /// Reads a type byte followed by the value it announces.
    pub fn read_value(&mut self) -> TraciResult<TraciValue> {
        let value_type = self.read_u8()?;
        self.read_value_of(value_type)
    }

    fn read_value_of(&mut self, value_type: u8) -> TraciResult<TraciValue> {
        let value = match value_type {
            TYPE_UBYTE => TraciValue::UByte(self.read_u8()?),
            TYPE_BYTE => TraciValue::Byte(self.read_i8()?),
            TYPE_INTEGER => TraciValue::Integer(self.read_i32()?),
            TYPE_DOUBLE => TraciValue::Double(self.read_f64()?),
            TYPE_STRING => TraciValue::Text(self.read_string()?),
            TYPE_STRINGLIST => TraciValue::TextList(self.read_string_list()?),
            TYPE_COMPOUND => {
                let count = self.read_length()?;
                let items = (0..count)
                    .map(|_| self.read_value())
                    .collect::<TraciResult<Vec<_>>>()?;
                TraciValue::Compound(items)
            }
            unknown => {
                return Err(TraciError::protocol(format!(
                    "unsupported value type 0x{:02x}",
                    unknown
                )))
            }
        };
        Ok(value)
    }

    /// Reads a command header and returns the command id with the number of content bytes
    /// that follow it.
    pub fn read_command_header(&mut self) -> TraciResult<(u8, usize)> {
        let short_length = self.read_u8()? as usize;
        let (length, header) = if short_length == 0 {
            (self.read_length()?, 1 + 4 + 1)
        } else {
            (short_length, 1 + 1)
        };
        let command_id = self.read_u8()?;
        let content = length.checked_sub(header).ok_or_else(|| {
            TraciError::protocol(format!(
                "command 0x{:02x} announces length {} shorter than its header",
                command_id, length
            ))
        })?;
        if content > self.remaining() {
            return Err(TraciError::protocol(format!(
                "command 0x{:02x} announces {} content bytes but only {} remain",
                command_id,
                content,
                self.remaining()
            )));
        }
        Ok((command_id, content))
    }

    /// Skips a whole command, header included.
    pub fn skip_command(&mut self) -> TraciResult<u8> {
        let (command_id, content) = self.read_command_header()?;
        self.skip(content)?;
        Ok(command_id)
    }
}
