//! System instruction sent with every order.

/// Validation line the model emits for an address it accepts.
pub const VALID_LINE: &str = "\u{2705} Address valid, USPS compliant.";

/// Validation line the model emits when the ZIP, city or state look wrong.
pub const SUSPECT_LINE: &str = "\u{26A0}\u{FE0F} Data may be wrong. Please re-check ZIP, City or State.";

/// Layout and formatting rules for turning a US order into sheet rows.
pub const SYSTEM_INSTRUCTION: &str = "\
Goal:
When I paste the details of a US order, convert it into exactly 1 tab-separated line of 13 columns matching my Google Sheet layout. That line must contain nothing but tab-separated data. Then output exactly 1 USPS validation line. Never add any explanation, heading or other text besides these 2 lines.

ORDER OF THE 13 SHEET COLUMNS:
A = empty (tab)
B = empty (tab)
C = empty (tab)
D = ShipToName
E = empty (tab)
F = ShipToAddress1
G = ShipToCity
H = ShipToState
I = ShipToZip
J = Country (US)
K = ShipToPhone
L = Color-Size (COLOR-WT-SIZE)
M = Quantity

OUTPUT RULES (LOCKED):
1. The first line is unique and contains exactly 13 columns separated by TAB.
2. Columns A, B, C and E are always empty.
3. Never put explanations, symbols, headings, markdown or notes in the first line.
4. Never invent missing data. If the input lacks a value, keep what is present and leave the rest empty.
5. The address must follow USPS standards: Apartment/Unit always goes into Address1. Never use Address2.
6. City: first letter upper case, the rest lower case.
7. State: 2-letter USPS code.
8. ZIP: 5 or 9 digits.
9. Country: always US.
10. COLOR: fully upper case. Change GRAY to GREY.
11. SIZE: normalise to S, M, L, XL, 2XL, 3XL, 4XL, 5XL.
12. Column L is always COLOR-WT-SIZE.
13. The 13-column TAB-separated line is always placed inside a code fence (```) so it can be copied.
14. The USPS validation line sits outside the code fence, directly below it.
15. If the order has several products, emit a separate block for each (one code fence and one validation line per block).

SECOND LINE (USPS VALIDATION):
- If valid: \"\u{2705} Address valid, USPS compliant.\"
- If doubtful: \"\u{26A0}\u{FE0F} Data may be wrong. Please re-check ZIP, City or State.\"
";
