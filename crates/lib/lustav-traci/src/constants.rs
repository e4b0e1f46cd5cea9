//! Command, variable and type identifiers of the TraCI protocol.

pub const CMD_GETVERSION: u8 = 0x00;
pub const CMD_SIMSTEP: u8 = 0x02;
pub const CMD_CLOSE: u8 = 0x7f;

pub const CMD_GET_TL_VARIABLE: u8 = 0xa2;
pub const CMD_GET_LANE_VARIABLE: u8 = 0xa3;
pub const CMD_GET_VEHICLE_VARIABLE: u8 = 0xa4;
pub const CMD_GET_SIM_VARIABLE: u8 = 0xab;

pub const CMD_SET_TL_VARIABLE: u8 = 0xc2;
pub const CMD_SET_VEHICLE_VARIABLE: u8 = 0xc4;

/// Offset between a get command and the command carrying its answer.
pub const RESPONSE_OFFSET: u8 = 0x10;

pub const RTYPE_OK: u8 = 0x00;
pub const RTYPE_NOTIMPLEMENTED: u8 = 0x01;
pub const RTYPE_ERR: u8 = 0xff;

pub const TYPE_UBYTE: u8 = 0x07;
pub const TYPE_BYTE: u8 = 0x08;
pub const TYPE_INTEGER: u8 = 0x09;
pub const TYPE_DOUBLE: u8 = 0x0b;
pub const TYPE_STRING: u8 = 0x0c;
pub const TYPE_STRINGLIST: u8 = 0x0e;
pub const TYPE_COMPOUND: u8 = 0x0f;

pub const TRACI_ID_LIST: u8 = 0x00;

pub const LAST_STEP_VEHICLE_ID_LIST: u8 = 0x12;

pub const TL_PHASE_DURATION: u8 = 0x24;
pub const TL_CONTROLLED_LANES: u8 = 0x26;
pub const TL_CURRENT_PHASE: u8 = 0x28;

pub const VAR_DEPARTURE: u8 = 0x3a;
pub const VAR_SPEED: u8 = 0x40;
pub const VAR_TYPE: u8 = 0x4f;
pub const VAR_FUELCONSUMPTION: u8 = 0x65;
pub const VAR_TIME: u8 = 0x66;
pub const VAR_DEPARTED_VEHICLES_IDS: u8 = 0x74;
pub const VAR_WAITING_TIME: u8 = 0x7a;
pub const VAR_MIN_EXPECTED_VEHICLES: u8 = 0x7d;
pub const VAR_ACCUMULATED_WAITING_TIME: u8 = 0x87;
pub const VAR_STOPSTATE: u8 = 0xb5;
